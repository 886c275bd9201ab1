use cells::{CellId, CellIndexer};
use runtime::{Scheduler, ThrottleTimer};

use crate::config::EngineConfig;
use crate::gesture::{GestureController, GestureEffect, GestureState, HostSnapshot, LongPressElapsed, SelectionMode};
use crate::grid::{CameraMove, GridLayer};
use crate::host::{LayerKind, LayerSpec, MapHost};
use crate::layer::{Layer, LayerId, LayerRegistry};
use crate::selection::SelectionSet;

/// Every timer a `SelectionLayer` schedules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerTimer {
    Move(ThrottleTimer),
    LongPress,
}

impl From<ThrottleTimer> for LayerTimer {
    fn from(timer: ThrottleTimer) -> Self {
        LayerTimer::Move(timer)
    }
}

impl From<LongPressElapsed> for LayerTimer {
    fn from(_: LongPressElapsed) -> Self {
        LayerTimer::LongPress
    }
}

/// A grid the user can select cells on, by tapping or by long-press and drag.
#[derive(Debug)]
pub struct SelectionLayer {
    id: LayerId,
    grid: GridLayer,
    source_id: String,
    fill_layer_id: String,
    selection: SelectionSet,
    gesture: GestureController,
    highlight: String,
    attached: bool,
}

impl SelectionLayer {
    pub fn new(registry: &mut LayerRegistry, config: EngineConfig) -> Self {
        let gesture = GestureController::new(config.long_press());
        let highlight = config.highlight.clone();
        let grid = GridLayer::new(registry, config);
        let id = registry.next_id();
        Self {
            id,
            grid,
            source_id: format!("h3-selection-{id}"),
            fill_layer_id: format!("h3-selection-fill-{id}"),
            selection: SelectionSet::new(),
            gesture,
            highlight,
            attached: false,
        }
    }

    pub fn grid(&self) -> &GridLayer {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridLayer {
        &mut self.grid
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    pub fn highlight(&self) -> &str {
        &self.highlight
    }

    pub fn set_highlight<H: MapHost + ?Sized>(&mut self, host: &mut H, color: &str) {
        self.highlight = color.to_string();
        if self.attached {
            host.set_fill_color(&self.fill_layer_id, &self.highlight);
        }
    }

    pub fn add_to<H, I>(&mut self, host: &mut H, indexer: &I)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        if self.attached {
            return;
        }
        self.grid.add_to(host, indexer);
        host.add_source(&self.source_id);
        host.add_layer(LayerSpec {
            id: self.fill_layer_id.clone(),
            source: self.source_id.clone(),
            kind: LayerKind::Fill,
            hide_close_to_pole: false,
        });
        host.set_fill_color(&self.fill_layer_id, &self.highlight);
        self.attached = true;
        self.redraw_selection(host);
    }

    pub fn remove<H, T, S>(&mut self, host: &mut H, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        S: Scheduler<T> + ?Sized,
    {
        if !self.attached {
            return;
        }
        for effect in self.gesture.abandon(scheduler) {
            if let GestureEffect::EndPaint(snapshot) = effect {
                restore(host, &snapshot);
            }
        }
        host.remove_layer(&self.fill_layer_id);
        host.remove_source(&self.source_id);
        self.grid.remove(host, scheduler);
        self.attached = false;
    }

    pub fn on_move<H, I, S>(&mut self, event: CameraMove, host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        S: Scheduler<LayerTimer> + ?Sized,
    {
        self.grid.on_move(event, host, indexer, scheduler);
    }

    pub fn on_timer<H, I, S>(&mut self, timer: LayerTimer, host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        S: Scheduler<LayerTimer> + ?Sized,
    {
        match timer {
            LayerTimer::Move(t) => self.grid.on_timer(t, host, indexer, scheduler),
            LayerTimer::LongPress => {
                let effects = self.gesture.long_press_elapsed();
                self.apply(effects, host, indexer);
            }
        }
    }

    /// Pointer pressed at `screen` (CSS pixels). Presses off the grid are ignored.
    pub fn pointer_down<H, I, S>(&mut self, screen: [f64; 2], host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        S: Scheduler<LayerTimer> + ?Sized,
    {
        if !self.attached {
            return;
        }
        let Some(cell) = self.cell_at(screen, host, indexer) else {
            return;
        };
        let already_selected = self.contains_cell(indexer, cell);
        let snapshot = HostSnapshot {
            drag_pan: host.drag_pan_enabled(),
            cursor: host.cursor(),
        };
        let effects = self.gesture.pointer_down(cell, already_selected, snapshot, scheduler);
        self.apply(effects, host, indexer);
    }

    pub fn pointer_move<H, I, S>(&mut self, screen: [f64; 2], host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        S: Scheduler<LayerTimer> + ?Sized,
    {
        let cell = match self.gesture.state() {
            GestureState::LongPressPainting => self.cell_at(screen, host, indexer),
            _ => None,
        };
        let effects = self.gesture.pointer_move(cell, scheduler);
        self.apply(effects, host, indexer);
    }

    pub fn pointer_up<H, I, S>(&mut self, host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        S: Scheduler<LayerTimer> + ?Sized,
    {
        let effects = self.gesture.pointer_up(scheduler);
        self.apply(effects, host, indexer);
    }

    pub fn contains_cell<I: CellIndexer + ?Sized>(&self, indexer: &I, cell: CellId) -> bool {
        self.selection.contains(indexer, cell).unwrap_or_else(|err| {
            tracing::warn!(%err, %cell, "membership test failed");
            false
        })
    }

    pub fn add_cell<H, I>(&mut self, host: &mut H, indexer: &I, cell: CellId)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        self.apply(vec![GestureEffect::Apply { mode: SelectionMode::Add, cell }], host, indexer);
    }

    pub fn remove_cell<H, I>(&mut self, host: &mut H, indexer: &I, cell: CellId)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        self.apply(vec![GestureEffect::Apply { mode: SelectionMode::Remove, cell }], host, indexer);
    }

    pub fn clear_selection<H: MapHost + ?Sized>(&mut self, host: &mut H) {
        self.selection.clear();
        self.redraw_selection(host);
    }

    fn cell_at<H, I>(&self, screen: [f64; 2], host: &H, indexer: &I) -> Option<CellId>
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        let point = host.unproject(screen)?;
        indexer
            .cell_at(point, self.grid.resolution())
            .inspect_err(|err| tracing::debug!(%err, "no cell under pointer"))
            .ok()
    }

    fn apply<H, I>(&mut self, effects: Vec<GestureEffect>, host: &mut H, indexer: &I)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        let mut changed = false;
        for effect in effects {
            match effect {
                GestureEffect::Apply { mode, cell } => {
                    let result = match mode {
                        SelectionMode::Add => self.selection.add(indexer, cell),
                        SelectionMode::Remove => self.selection.remove(indexer, cell),
                    };
                    match result {
                        Ok(()) => changed = true,
                        Err(err) => tracing::warn!(%err, %cell, ?mode, "selection update failed"),
                    }
                }
                GestureEffect::BeginPaint => {
                    host.set_drag_pan(false);
                    host.set_cursor(&self.grid.config().paint_cursor);
                }
                GestureEffect::EndPaint(snapshot) => restore(host, &snapshot),
            }
        }
        if changed {
            self.redraw_selection(host);
        }
    }

    fn redraw_selection<H: MapHost + ?Sized>(&self, host: &mut H) {
        if self.attached {
            host.set_source_data(&self.source_id, self.selection.to_geojson());
        }
    }
}

fn restore<H: MapHost + ?Sized>(host: &mut H, snapshot: &HostSnapshot) {
    if snapshot.drag_pan {
        host.set_drag_pan(true);
    }
    host.set_cursor(&snapshot.cursor);
}

impl Layer for SelectionLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
