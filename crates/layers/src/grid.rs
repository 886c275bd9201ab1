use std::collections::BTreeSet;

use cells::{CellId, CellIndexer, Resolution};
use foundation::arena::IdArena;
use foundation::ids::DisplayId;
use foundation::math;
use geo::{MultiPolygon, Polygon};
use runtime::{MoveThrottle, Scheduler, ThrottleTimer};

use crate::chunks::{self, ChunkGrid};
use crate::config::EngineConfig;
use crate::error::LayerError;
use crate::feature::{CellFeature, FeatureCollection};
use crate::host::{LayerKind, LayerSpec, MapHost};
use crate::layer::{Layer, LayerId, LayerRegistry};
use crate::viewport;

/// Turns a viewport polygon into the set of cells covering it.
#[derive(Debug)]
pub struct GridBuilder<'a, I: CellIndexer + ?Sized> {
    indexer: &'a I,
    config: &'a EngineConfig,
}

impl<'a, I: CellIndexer + ?Sized> GridBuilder<'a, I> {
    pub fn new(indexer: &'a I, config: &'a EngineConfig) -> Self {
        Self { indexer, config }
    }

    /// Cells covering `viewport` at `resolution`, each listed once.
    ///
    /// Every chunk is buffered by the chunk size and clipped to the
    /// viewport's bounding box before rasterizing, so cells straddling chunk
    /// borders and the margins left by the grid are still found. A chunk the
    /// index rejects is skipped.
    pub fn cell_ids(&self, viewport: &Polygon<f64>, resolution: Resolution) -> BTreeSet<CellId> {
        let grid = ChunkGrid::over(viewport, self.config.chunk_scale, self.config.max_chunks);
        let mut cells = BTreeSet::new();
        let Some(window) = math::bbox(viewport).map(|b| b.to_polygon()) else {
            return cells;
        };
        for chunk in &grid.chunks {
            let buffered = MultiPolygon::new(vec![math::buffer(chunk, grid.size)]);
            // Covering cells already reach past the window, so the buffer never needs to.
            let clipped = math::intersection(&buffered, &window);
            for piece in clipped.iter().flat_map(chunks::canonical_pieces) {
                match self.indexer.polygon_to_cells(&piece, resolution) {
                    Ok(found) => cells.extend(found),
                    Err(err) => tracing::warn!(%err, "skipping chunk the index rejected"),
                }
            }
        }
        tracing::debug!(chunks = grid.chunks.len(), cells = cells.len(), %resolution, "grid cells collected");
        cells
    }

    /// Builds a display feature for one cell.
    pub fn feature(&self, cell: CellId, id: DisplayId) -> Result<CellFeature, LayerError> {
        let boundary = self.indexer.cell_to_polygon(cell)?;
        let (polygon, crosses_antimeridian) = math::normalize_polygon(boundary);
        let close_to_pole = math::is_close_to_pole(&polygon, self.config.close_to_pole_deg);
        Ok(CellFeature {
            id,
            cell,
            polygon,
            close_to_pole,
            crosses_antimeridian,
        })
    }

    /// Cells over `viewport` at the resolution for `zoom`, with fresh
    /// display ids drawn from `ids`.
    pub fn build(
        &self,
        viewport: &Polygon<f64>,
        zoom: f64,
        ids: &mut IdArena<DisplayId>,
    ) -> (Resolution, FeatureCollection) {
        let resolution = self.config.resolution_for_zoom(zoom);
        let mut features = Vec::new();
        for cell in self.cell_ids(viewport, resolution) {
            match self.feature(cell, ids.alloc()) {
                Ok(f) => features.push(f),
                Err(err) => tracing::warn!(%err, %cell, "dropping cell without boundary"),
            }
        }
        (resolution, FeatureCollection { features })
    }
}

/// What the throttle's redraw callback needs; kept apart from the throttle
/// itself so both can be borrowed at once.
#[derive(Debug)]
struct GridState {
    config: EngineConfig,
    source_id: String,
    ids: IdArena<DisplayId>,
    resolution: Resolution,
    attached: bool,
}

impl GridState {
    fn redraw<H, I>(&mut self, host: &mut H, indexer: &I) -> Result<usize, LayerError>
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        if !self.attached {
            return Ok(0);
        }
        let viewport = viewport::sample_viewport(host, self.config.samples_per_side)?;
        let builder = GridBuilder::new(indexer, &self.config);
        let (resolution, collection) = builder.build(&viewport, host.zoom(), &mut self.ids);
        self.resolution = resolution;
        host.set_source_data(&self.source_id, collection.to_geojson());
        Ok(collection.len())
    }

    fn redraw_or_skip<H, I>(&mut self, host: &mut H, indexer: &I)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        match self.redraw(host, indexer) {
            Ok(count) => tracing::trace!(count, "grid redrawn"),
            Err(LayerError::ViewportUnavailable { x, y }) => {
                tracing::debug!(x, y, "viewport unavailable, keeping previous grid")
            }
            Err(err) => tracing::warn!(%err, "grid redraw failed"),
        }
    }
}

/// Camera change notification from the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CameraMove {
    /// Alt held during the move: the grid stays frozen.
    pub alt_key: bool,
}

/// Hexagon grid over the visible map, redrawn as the camera moves.
#[derive(Debug)]
pub struct GridLayer {
    id: LayerId,
    fill_layer_id: String,
    line_layer_id: String,
    state: GridState,
    throttle: MoveThrottle,
    /// Alt flag of the latest move, which the trailing redraw stands in for.
    trailing_alt: bool,
    hovered: Option<DisplayId>,
}

impl GridLayer {
    pub fn new(registry: &mut LayerRegistry, config: EngineConfig) -> Self {
        let id = registry.next_id();
        let throttle = MoveThrottle::new(config.move_cooldown(), config.move_trailing());
        let resolution = config.resolution_for_zoom(0.0);
        Self {
            id,
            fill_layer_id: format!("h3-grid-fill-{id}"),
            line_layer_id: format!("h3-grid-lines-{id}"),
            state: GridState {
                config,
                source_id: format!("h3-grid-{id}"),
                ids: IdArena::new(),
                resolution,
                attached: false,
            },
            throttle,
            trailing_alt: false,
            hovered: None,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.state.source_id
    }

    pub fn fill_layer_id(&self) -> &str {
        &self.fill_layer_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    /// Resolution of the most recent redraw.
    pub fn resolution(&self) -> Resolution {
        self.state.resolution
    }

    pub fn is_attached(&self) -> bool {
        self.state.attached
    }

    pub fn hovered(&self) -> Option<DisplayId> {
        self.hovered
    }

    /// Registers the source and its fill and outline layers, then draws.
    pub fn add_to<H, I>(&mut self, host: &mut H, indexer: &I)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        if self.state.attached {
            return;
        }
        host.add_source(&self.state.source_id);
        for (layer_id, kind) in [
            (&self.fill_layer_id, LayerKind::Fill),
            (&self.line_layer_id, LayerKind::Line),
        ] {
            host.add_layer(LayerSpec {
                id: layer_id.clone(),
                source: self.state.source_id.clone(),
                kind,
                hide_close_to_pole: true,
            });
        }
        self.state.attached = true;
        tracing::debug!(layer = %self.id, "grid attached");
        self.state.redraw_or_skip(host, indexer);
    }

    /// Unregisters everything `add_to` created and cancels pending redraws.
    pub fn remove<H, T, S>(&mut self, host: &mut H, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        S: Scheduler<T> + ?Sized,
    {
        if !self.state.attached {
            return;
        }
        self.throttle.reset(scheduler);
        host.remove_layer(&self.line_layer_id);
        host.remove_layer(&self.fill_layer_id);
        host.remove_source(&self.state.source_id);
        self.state.attached = false;
        self.trailing_alt = false;
        self.hovered = None;
        tracing::debug!(layer = %self.id, "grid removed");
    }

    /// Recomputes the grid now, bypassing the throttle.
    pub fn redraw<H, I>(&mut self, host: &mut H, indexer: &I) -> Result<usize, LayerError>
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
    {
        self.state.redraw(host, indexer)
    }

    pub fn on_move<H, I, T, S>(&mut self, event: CameraMove, host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        T: From<ThrottleTimer>,
        S: Scheduler<T> + ?Sized,
    {
        if !self.state.attached {
            return;
        }
        self.trailing_alt = event.alt_key;
        let state = &mut self.state;
        self.throttle.on_move(scheduler, || {
            if !event.alt_key {
                state.redraw_or_skip(host, indexer);
            }
        });
    }

    /// Delivers a throttle timer scheduled by `on_move`.
    pub fn on_timer<H, I, T, S>(&mut self, timer: ThrottleTimer, host: &mut H, indexer: &I, scheduler: &mut S)
    where
        H: MapHost + ?Sized,
        I: CellIndexer + ?Sized,
        T: From<ThrottleTimer>,
        S: Scheduler<T> + ?Sized,
    {
        let alt_key = self.trailing_alt;
        let state = &mut self.state;
        self.throttle.on_timer(timer, scheduler, || {
            if !alt_key {
                state.redraw_or_skip(host, indexer);
            }
        });
    }

    /// Pointer moved over `feature` (or off every cell when `None`).
    pub fn on_cell_hover<H: MapHost + ?Sized>(&mut self, host: &mut H, feature: Option<DisplayId>) {
        if self.hovered.is_some() && self.hovered != feature {
            self.on_cell_leave(host);
        }
        if self.hovered.is_none() {
            if let Some(id) = feature {
                host.set_feature_state(&self.state.source_id, id, true);
                self.hovered = Some(id);
            }
        }
    }

    pub fn on_cell_leave<H: MapHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(id) = self.hovered.take() {
            host.set_feature_state(&self.state.source_id, id, false);
        }
    }
}

impl Layer for GridLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::testing::{SquareIndexer, chicago_host};
    use cells::H3Indexer;
    use foundation::math::MercatorCamera;
    use geo::{Contains, Intersects, coord};
    use pretty_assertions::assert_eq;
    use runtime::ManualScheduler;
    use std::collections::HashSet;
    use std::time::Duration;

    fn feature_ids(host: &HeadlessHost, source: &str) -> Vec<u64> {
        host.source_data(source).unwrap()["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn every_viewport_point_is_covered_by_some_cell() {
        let config = EngineConfig::default();
        let indexer = SquareIndexer::new(0.25);
        let host = chicago_host(6.0);
        let viewport = viewport::sample_viewport(&host, 3).unwrap();
        let builder = GridBuilder::new(&indexer, &config);
        let (_, collection) = builder.build(&viewport, host.camera.zoom, &mut IdArena::new());

        let bounds = math::bbox(&viewport).unwrap();
        for i in 0..=10 {
            for j in 0..=10 {
                let p = coord! {
                    x: bounds.min[0] + bounds.width() * i as f64 / 10.0,
                    y: bounds.min[1] + bounds.height() * j as f64 / 10.0,
                };
                if !viewport.contains(&p) {
                    continue;
                }
                assert!(
                    collection.iter().any(|f| f.polygon.intersects(&p)),
                    "point {p:?} not covered"
                );
            }
        }
    }

    #[test]
    fn chicago_at_zoom_ten_uses_resolution_seven_with_unique_ids() {
        let config = EngineConfig::default();
        let indexer = H3Indexer::new();
        let host = chicago_host(10.0);
        let viewport = viewport::sample_viewport(&host, 3).unwrap();
        let builder = GridBuilder::new(&indexer, &config);
        let (resolution, collection) = builder.build(&viewport, host.camera.zoom, &mut IdArena::new());

        assert_eq!(resolution.get(), 7);
        assert!(!collection.is_empty());
        let ids: HashSet<_> = collection.iter().map(|f| f.id).collect();
        let cells: HashSet<_> = collection.iter().map(|f| f.cell).collect();
        assert_eq!(ids.len(), collection.len());
        assert_eq!(cells.len(), collection.len());
        assert!(collection.iter().all(|f| !f.close_to_pole && !f.crosses_antimeridian));
    }

    #[test]
    fn chicago_bbox_cells_cover_its_center() {
        let config = EngineConfig::default();
        let indexer = H3Indexer::new();
        let viewport = foundation::bounds::Aabb2::new([-88.0, 41.5], [-87.5, 42.0]).to_polygon();
        let (resolution, collection) =
            GridBuilder::new(&indexer, &config).build(&viewport, 10.0, &mut IdArena::new());
        assert_eq!(resolution.get(), 7);
        let center = indexer.cell_at(coord! { x: -87.75, y: 41.75 }, resolution).unwrap();
        assert!(collection.iter().any(|f| f.cell == center));
        let ids: Vec<u64> = collection.iter().map(|f| f.id.get()).collect();
        assert_eq!(ids, (0..collection.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn viewport_short_of_the_poles_yields_no_pole_cells() {
        let config = EngineConfig::default();
        let indexer = H3Indexer::new();
        let viewport = foundation::bounds::Aabb2::new([-90.0, -80.0], [90.0, 80.0]).to_polygon();
        let (resolution, collection) =
            GridBuilder::new(&indexer, &config).build(&viewport, 3.0, &mut IdArena::new());
        assert_eq!(resolution.get(), 2);
        assert!(collection.iter().all(|f| !f.close_to_pole));

        for i in 0..=18 {
            for j in 0..=16 {
                let p = coord! { x: -90.0 + 10.0 * i as f64, y: -80.0 + 10.0 * j as f64 };
                assert!(
                    collection.iter().any(|f| f.polygon.intersects(&p)),
                    "point {p:?} not covered"
                );
            }
        }
    }

    #[test]
    fn add_to_registers_source_and_layers_then_draws() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        layer.add_to(&mut host, &SquareIndexer::new(0.5));

        assert_eq!(layer.source_id(), "h3-grid-0");
        let layer_ids: Vec<_> = host.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(layer_ids, vec!["h3-grid-fill-0", "h3-grid-lines-0"]);
        assert!(!feature_ids(&host, "h3-grid-0").is_empty());

        let mut scheduler: ManualScheduler<ThrottleTimer> = ManualScheduler::new();
        layer.remove(&mut host, &mut scheduler);
        assert!(!host.has_source("h3-grid-0"));
        assert!(host.layers().is_empty());
    }

    #[test]
    fn unavailable_viewport_keeps_the_previous_grid() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        let indexer = SquareIndexer::new(0.5);
        layer.add_to(&mut host, &indexer);
        let before = host.source_data("h3-grid-0").cloned();

        host.set_blind(true);
        assert!(matches!(
            layer.redraw(&mut host, &indexer),
            Err(LayerError::ViewportUnavailable { .. })
        ));
        assert_eq!(host.source_data("h3-grid-0").cloned(), before);
    }

    #[test]
    fn burst_of_moves_redraws_twice() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        let indexer = SquareIndexer::new(0.5);
        let mut scheduler: ManualScheduler<ThrottleTimer> = ManualScheduler::new();
        layer.add_to(&mut host, &indexer);
        let initial = feature_ids(&host, "h3-grid-0");

        for _ in 0..5 {
            layer.on_move(CameraMove::default(), &mut host, &indexer, &mut scheduler);
        }
        let after_first = feature_ids(&host, "h3-grid-0");
        assert!(after_first[0] > *initial.last().unwrap());

        for timer in scheduler.advance(Duration::from_millis(700)) {
            layer.on_timer(timer, &mut host, &indexer, &mut scheduler);
        }
        for timer in scheduler.advance(Duration::from_millis(200)) {
            layer.on_timer(timer, &mut host, &indexer, &mut scheduler);
        }
        let after_trailing = feature_ids(&host, "h3-grid-0");
        assert!(after_trailing[0] > *after_first.last().unwrap());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn alt_moves_leave_the_grid_alone() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        let indexer = SquareIndexer::new(0.5);
        let mut scheduler: ManualScheduler<ThrottleTimer> = ManualScheduler::new();
        layer.add_to(&mut host, &indexer);
        let before = host.source_data("h3-grid-0").cloned();

        host.camera = MercatorCamera::new(coord! { x: -80.0, y: 30.0 }, 8.0, 1024.0, 768.0);
        layer.on_move(CameraMove { alt_key: true }, &mut host, &indexer, &mut scheduler);
        assert_eq!(host.source_data("h3-grid-0").cloned(), before);
    }

    #[test]
    fn alt_burst_never_redraws_after_cooldown() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        let indexer = SquareIndexer::new(0.5);
        let mut scheduler: ManualScheduler<ThrottleTimer> = ManualScheduler::new();
        layer.add_to(&mut host, &indexer);
        let before = host.source_data("h3-grid-0").cloned();

        host.camera = MercatorCamera::new(coord! { x: -80.0, y: 30.0 }, 8.0, 1024.0, 768.0);
        for _ in 0..3 {
            layer.on_move(CameraMove { alt_key: true }, &mut host, &indexer, &mut scheduler);
        }
        for timer in scheduler.advance(Duration::from_millis(550)) {
            layer.on_timer(timer, &mut host, &indexer, &mut scheduler);
        }
        for timer in scheduler.advance(Duration::from_millis(200)) {
            layer.on_timer(timer, &mut host, &indexer, &mut scheduler);
        }
        assert_eq!(host.source_data("h3-grid-0").cloned(), before);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn hover_tracks_a_single_feature() {
        let mut registry = LayerRegistry::new();
        let mut layer = GridLayer::new(&mut registry, EngineConfig::default());
        let mut host = chicago_host(8.0);
        layer.add_to(&mut host, &SquareIndexer::new(0.5));

        layer.on_cell_hover(&mut host, Some(DisplayId(3)));
        assert!(host.feature_hovered("h3-grid-0", DisplayId(3)));
        layer.on_cell_hover(&mut host, Some(DisplayId(4)));
        assert!(!host.feature_hovered("h3-grid-0", DisplayId(3)));
        assert!(host.feature_hovered("h3-grid-0", DisplayId(4)));
        layer.on_cell_leave(&mut host);
        assert!(!host.feature_hovered("h3-grid-0", DisplayId(4)));
        assert_eq!(layer.hovered(), None);
    }
}
