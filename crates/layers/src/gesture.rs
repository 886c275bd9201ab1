//! Tap and long-press-and-drag selection gesture.
//!
//! The controller is a pure state machine: it takes pointer events already
//! resolved to cells and returns the effects the owning layer must carry out.
//! It never touches the selection or the host itself.

use std::collections::HashSet;
use std::time::Duration;

use cells::CellId;
use runtime::{Scheduler, TimerHandle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is down and the long-press timer is running.
    PendingPress,
    /// Long press fired; every cell the pointer enters gets the gesture's mode.
    LongPressPainting,
    /// Pointer moved before the long press; the map pans and nothing is applied.
    DraggingWithoutPaint,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    Add,
    Remove,
}

/// Timer payload for the long-press delay.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LongPressElapsed;

/// Host state captured at pointer-down and restored when painting ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    pub drag_pan: bool,
    pub cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEffect {
    Apply { mode: SelectionMode, cell: CellId },
    /// Disable drag-pan and show the paint cursor.
    BeginPaint,
    /// Put back what `BeginPaint` changed.
    EndPaint(HostSnapshot),
}

#[derive(Debug)]
struct ActiveGesture {
    start: CellId,
    mode: SelectionMode,
    moved: bool,
    last_dragged: Option<CellId>,
    painted: HashSet<CellId>,
    timer: Option<TimerHandle>,
    snapshot: HostSnapshot,
}

#[derive(Debug)]
pub struct GestureController {
    state: GestureState,
    long_press: Duration,
    active: Option<ActiveGesture>,
}

impl GestureController {
    pub fn new(long_press: Duration) -> Self {
        Self {
            state: GestureState::Idle,
            long_press,
            active: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Mode of the gesture in progress.
    pub fn mode(&self) -> Option<SelectionMode> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// Starts a gesture on `cell`. The mode is fixed here: remove when the
    /// cell is already selected, add otherwise.
    ///
    /// A pointer-down while a gesture is still active first ends that gesture
    /// without applying a tap.
    pub fn pointer_down<T, S>(
        &mut self,
        cell: CellId,
        already_selected: bool,
        snapshot: HostSnapshot,
        scheduler: &mut S,
    ) -> Vec<GestureEffect>
    where
        T: From<LongPressElapsed>,
        S: Scheduler<T> + ?Sized,
    {
        let effects = self.abandon(scheduler);
        let mode = if already_selected {
            SelectionMode::Remove
        } else {
            SelectionMode::Add
        };
        let timer = scheduler.schedule(self.long_press, T::from(LongPressElapsed));
        self.active = Some(ActiveGesture {
            start: cell,
            mode,
            moved: false,
            last_dragged: None,
            painted: HashSet::new(),
            timer: Some(timer),
            snapshot,
        });
        self.state = GestureState::PendingPress;
        tracing::trace!(%cell, ?mode, "gesture started");
        effects
    }

    /// The long-press timer fired. Applies the mode to the starting cell and
    /// switches to painting.
    pub fn long_press_elapsed(&mut self) -> Vec<GestureEffect> {
        if self.state != GestureState::PendingPress {
            return Vec::new();
        }
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        active.timer = None;
        active.last_dragged = Some(active.start);
        active.painted.insert(active.start);
        self.state = GestureState::LongPressPainting;
        vec![
            GestureEffect::Apply {
                mode: active.mode,
                cell: active.start,
            },
            GestureEffect::BeginPaint,
        ]
    }

    /// Pointer moved; `cell` is the cell under it, if any.
    pub fn pointer_move<T, S>(&mut self, cell: Option<CellId>, scheduler: &mut S) -> Vec<GestureEffect>
    where
        S: Scheduler<T> + ?Sized,
    {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        active.moved = true;
        match self.state {
            GestureState::PendingPress => {
                if let Some(h) = active.timer.take() {
                    scheduler.cancel(h);
                }
                self.state = GestureState::DraggingWithoutPaint;
                Vec::new()
            }
            GestureState::LongPressPainting => {
                let Some(cell) = cell else {
                    return Vec::new();
                };
                if active.last_dragged == Some(cell) {
                    return Vec::new();
                }
                active.last_dragged = Some(cell);
                if !active.painted.insert(cell) {
                    return Vec::new();
                }
                vec![GestureEffect::Apply {
                    mode: active.mode,
                    cell,
                }]
            }
            GestureState::Idle | GestureState::DraggingWithoutPaint => Vec::new(),
        }
    }

    /// Pointer released. A press that never moved is a tap and applies the
    /// mode to the starting cell.
    pub fn pointer_up<T, S>(&mut self, scheduler: &mut S) -> Vec<GestureEffect>
    where
        S: Scheduler<T> + ?Sized,
    {
        let Some(mut active) = self.active.take() else {
            return Vec::new();
        };
        if let Some(h) = active.timer.take() {
            scheduler.cancel(h);
        }
        let effects = match self.state {
            GestureState::LongPressPainting => vec![GestureEffect::EndPaint(active.snapshot)],
            _ if !active.moved => vec![GestureEffect::Apply {
                mode: active.mode,
                cell: active.start,
            }],
            _ => Vec::new(),
        };
        self.state = GestureState::Idle;
        effects
    }

    /// Ends the current gesture without applying anything. Painting effects
    /// are still undone.
    pub fn abandon<T, S>(&mut self, scheduler: &mut S) -> Vec<GestureEffect>
    where
        S: Scheduler<T> + ?Sized,
    {
        let Some(mut active) = self.active.take() else {
            return Vec::new();
        };
        if let Some(h) = active.timer.take() {
            scheduler.cancel(h);
        }
        let painting = self.state == GestureState::LongPressPainting;
        self.state = GestureState::Idle;
        if painting {
            vec![GestureEffect::EndPaint(active.snapshot)]
        } else {
            Vec::new()
        }
    }
}
