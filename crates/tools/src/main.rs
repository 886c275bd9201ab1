use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cells::{CellIndexer, H3Indexer};
use clap::{Args, Parser, Subcommand};
use foundation::arena::IdArena;
use foundation::camera::CameraPosition;
use foundation::math::MercatorCamera;
use geo::coord;
use layers::viewport;
use layers::{EngineConfig, GridBuilder, HeadlessHost, LayerRegistry, LayerTimer, MapHost, SelectionLayer};
use runtime::ManualScheduler;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Hexagon grid and cell selection for a map viewport", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the grid covering the viewport as GeoJSON
    Grid(ViewArgs),
    /// Tap screen points and print the resulting selection as GeoJSON
    Select {
        #[command(flatten)]
        view: ViewArgs,
        /// Screen point `x,y` in CSS pixels; repeat to tap several cells
        #[arg(long = "tap", value_name = "X,Y", value_parser = parse_point)]
        taps: Vec<[f64; 2]>,
    },
    /// Print the cell under the viewport center
    Cell(ViewArgs),
}

#[derive(Args)]
struct ViewArgs {
    /// Camera as `lng,lat,zoom`; missing parts fall back to the default view
    #[arg(long, default_value_t = CameraPosition::DEFAULT, allow_hyphen_values = true)]
    position: CameraPosition,
    /// Canvas size `WIDTHxHEIGHT` in CSS pixels
    #[arg(long, default_value = "1024x768", value_parser = parse_size)]
    size: [f64; 2],
    /// Map rotation in degrees, clockwise
    #[arg(long, default_value_t = 0.0)]
    bearing: f64,
    #[arg(long, default_value_t = 1.0)]
    device_pixel_ratio: f64,
    /// Engine config JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write output here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    out: Option<PathBuf>,
}

impl ViewArgs {
    fn host(&self) -> HeadlessHost {
        let camera = MercatorCamera::new(
            coord! { x: self.position.lng, y: self.position.lat },
            self.position.zoom,
            self.size[0],
            self.size[1],
        )
        .with_bearing(self.bearing);
        HeadlessHost::new(camera).with_device_pixel_ratio(self.device_pixel_ratio)
    }

    fn config(&self) -> Result<EngineConfig> {
        match &self.config {
            Some(path) => load_config(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Grid(view) => cmd_grid(&view),
        Command::Select { view, taps } => cmd_select(&view, &taps),
        Command::Cell(view) => cmd_cell(&view),
    }
}

fn cmd_grid(view: &ViewArgs) -> Result<()> {
    let config = view.config()?;
    let indexer = H3Indexer::new();
    let host = view.host();
    let viewport = viewport::sample_viewport(&host, config.samples_per_side)
        .with_context(|| format!("no grid for camera {}", view.position))?;
    let builder = GridBuilder::new(&indexer, &config);
    let (resolution, collection) = builder.build(&viewport, host.zoom(), &mut IdArena::new());
    info!(cells = collection.len(), %resolution, position = %view.position, "grid computed");

    write_json(view.out.as_deref(), &collection.to_geojson())
}

fn cmd_select(view: &ViewArgs, taps: &[[f64; 2]]) -> Result<()> {
    if taps.is_empty() {
        bail!("select needs at least one --tap X,Y");
    }
    let config = view.config()?;
    let indexer = H3Indexer::new();
    let mut host = view.host();
    let mut registry = LayerRegistry::new();
    let mut scheduler: ManualScheduler<LayerTimer> = ManualScheduler::new();
    let mut layer = SelectionLayer::new(&mut registry, config);

    layer.add_to(&mut host, &indexer);
    for &point in taps {
        layer.pointer_down(point, &mut host, &indexer, &mut scheduler);
        layer.pointer_up(&mut host, &indexer, &mut scheduler);
    }
    info!(
        taps = taps.len(),
        parts = layer.selection().geometry().0.len(),
        "selection computed"
    );

    let data = source_data(&host, layer.source_id())?;
    write_json(view.out.as_deref(), data)
}

fn cmd_cell(view: &ViewArgs) -> Result<()> {
    let config = view.config()?;
    let indexer = H3Indexer::new();
    let host = view.host();
    let [w, h] = host.canvas_size().css();
    let center = host
        .unproject([w / 2.0, h / 2.0])
        .context("viewport center does not hit the globe")?;
    let resolution = config.resolution_for_zoom(host.zoom());
    let cell = indexer.cell_at(center, resolution)?;

    let out = serde_json::json!({
        "cell": cell.to_string(),
        "resolution": resolution.get(),
        "position": view.position.to_string(),
    });
    write_json(view.out.as_deref(), &out)
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    EngineConfig::from_json_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn source_data<'a>(host: &'a HeadlessHost, source_id: &str) -> Result<&'a Value> {
    host.source_data(source_id)
        .with_context(|| format!("source {source_id} was never filled"))
}

fn write_json(out: Option<&Path>, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }
    Ok(())
}

fn parse_size(s: &str) -> Result<[f64; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| *n > 0.0 && n.is_finite())
            .ok_or_else(|| format!("invalid dimension {v:?}"))
    };
    Ok([parse(w)?, parse(h)?])
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok([parse(x)?, parse(y)?])
}
