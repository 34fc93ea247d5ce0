use netmap::panel::{FetchData, FetchKind, MapBackend, MapEvent, MapPanel, pump};
use netmap::render::{ImageDescriptor, StaticImageSource, SvgRenderOptions, render_map_svg};
use netmap::{
    HeadlessError, HeadlessResult, MapConfig, OverlayMode, OverlayReport, PanelSettings,
    StatusReport, StpStatus, TopologySnapshot,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Map(HeadlessError),
    Json(serde_json::Error),
    NotRendered(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Map(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NotRendered(reason) => write!(f, "map was not rendered: {reason}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Map(value)
    }
}

impl From<netmap::Error> for CliError {
    fn from(value: netmap::Error) -> Self {
        Self::Map(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Payload,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    status: Option<PathBuf>,
    overlay: Option<PathBuf>,
    stp: Option<PathBuf>,
    config: Vec<PathBuf>,
    stencils: Option<PathBuf>,
    view_all: bool,
    show_address: bool,
    pretty: bool,
    zoom: Option<f64>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    diagram_id: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "netmap-cli\n\
\n\
USAGE:\n\
  netmap-cli [render] [--status <path>] [--overlay <path>] [--stp <path>] [--config <path>] [--stencils <path>] [--view-all] [--show-address] [--zoom <n>] [--viewport-width <w>] [--viewport-height <h>] [--id <diagram-id>] [--out <path>] [<snapshot>|-]\n\
  netmap-cli payload [--pretty] [--config <path>] [--stencils <path>] [--view-all] [<snapshot>|-]\n\
\n\
NOTES:\n\
  - If <snapshot> is omitted or '-', the topology snapshot is read from stdin.\n\
  - --status, --overlay and --stp answer the status, load overlay and spanning-tree polls.\n\
  - --config may repeat; later files are layered over earlier ones.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - payload prints the layout that a save would send back.\n\
  - Set RUST_LOG (e.g. RUST_LOG=netmap=debug) for diagnostics on stderr.\n\
"
}

fn next_path<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<PathBuf, CliError> {
    it.next()
        .map(PathBuf::from)
        .ok_or(CliError::Usage(usage()))
}

fn next_positive<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(raw) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "payload" => args.command = Command::Payload,
            "--status" => args.status = Some(next_path(&mut it)?),
            "--overlay" => args.overlay = Some(next_path(&mut it)?),
            "--stp" => args.stp = Some(next_path(&mut it)?),
            "--config" => args.config.push(next_path(&mut it)?),
            "--stencils" => args.stencils = Some(next_path(&mut it)?),
            "--view-all" => args.view_all = true,
            "--show-address" => args.show_address = true,
            "--pretty" => args.pretty = true,
            "--zoom" => args.zoom = Some(next_positive(&mut it)?),
            "--viewport-width" => args.viewport_width = Some(next_positive(&mut it)?),
            "--viewport-height" => args.viewport_height = Some(next_positive(&mut it)?),
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

/// Answers every poll from documents loaded up front. Polls without a document get an empty
/// answer.
struct FileBackend {
    snapshot: Option<String>,
    status: StatusReport,
    overlay: OverlayReport,
    stp: StpStatus,
}

impl MapBackend for FileBackend {
    fn fetch(&mut self, kind: &FetchKind) -> HeadlessResult<FetchData> {
        match kind {
            FetchKind::Snapshot { map_id } => {
                let Some(text) = self.snapshot.take() else {
                    return Err(HeadlessError::Fetch {
                        message: format!("snapshot `{map_id}` was already served"),
                    });
                };
                Ok(FetchData::Snapshot(TopologySnapshot::from_json_str(&text)?))
            }
            FetchKind::ObjectStatus { objects, .. } => {
                tracing::debug!(objects = objects.len(), "serving status poll");
                Ok(FetchData::ObjectStatus(self.status.clone()))
            }
            FetchKind::Overlay { ports, .. } => {
                tracing::debug!(ports = ports.len(), "serving overlay poll");
                Ok(FetchData::Overlay(self.overlay.clone()))
            }
            FetchKind::Stp { .. } => Ok(FetchData::Stp(self.stp.clone())),
        }
    }
}

fn build_panel(args: &Args) -> Result<MapPanel, CliError> {
    let mut cfg = MapConfig::default();
    for path in &args.config {
        let layer: serde_json::Value = read_json(path)?;
        cfg.deep_merge(&layer);
    }
    let settings = PanelSettings::from_config(&cfg);

    let mut images = StaticImageSource::new();
    if let Some(path) = &args.stencils {
        let stencils: Vec<ImageDescriptor> = read_json(path)?;
        for s in stencils {
            images.insert(s);
        }
    }

    Ok(MapPanel::with_settings(settings, Box::new(images)))
}

fn run(args: Args) -> Result<(), CliError> {
    let now = Instant::now();
    let mut backend = FileBackend {
        snapshot: Some(read_input(args.input.as_deref())?),
        status: match &args.status {
            Some(path) => read_json(path)?,
            None => StatusReport::default(),
        },
        overlay: match &args.overlay {
            Some(path) => read_json(path)?,
            None => OverlayReport::default(),
        },
        stp: match &args.stp {
            Some(path) => read_json(path)?,
            None => StpStatus::default(),
        },
    };

    let mut panel = build_panel(&args)?;
    panel.set_view_all(args.view_all)?;
    panel.set_show_address(args.show_address);
    if args.overlay.is_some() {
        panel.set_overlay_mode(OverlayMode::Load, now)?;
    }
    if args.stp.is_some() {
        panel.toggle_stp(true)?;
    }

    let map_id = args.input.clone().unwrap_or_else(|| "-".to_string());
    panel.load_map(map_id)?;
    let served = pump(&mut panel, &mut backend, now)?;
    tracing::debug!(served, "backend requests answered");

    let mut rendered = false;
    let mut notices = Vec::new();
    for event in panel.drain_events() {
        match event {
            MapEvent::Rendered(outcome) => {
                tracing::info!(
                    nodes = outcome.nodes,
                    links = outcome.links,
                    badges = outcome.badges,
                    skipped = outcome.skipped_nodes,
                    dropped = outcome.dropped_links,
                    "map rendered"
                );
                rendered = true;
            }
            MapEvent::Notice(message) => {
                tracing::warn!("{message}");
                notices.push(message);
            }
            other => tracing::debug!(?other, "map event"),
        }
    }
    if !rendered {
        return Err(CliError::NotRendered(notices.join("; ")));
    }

    if let (Some(w), Some(h)) = (args.viewport_width, args.viewport_height) {
        panel.resize(w, h)?;
    }
    if let Some(zoom) = args.zoom {
        panel.set_zoom(zoom)?;
    }

    match args.command {
        Command::Render => {
            let svg = render_map_svg(
                panel.renderer(),
                &SvgRenderOptions {
                    diagram_id: args.diagram_id.clone(),
                    ..Default::default()
                },
            );
            write_text(&svg, args.out.as_deref())
        }
        Command::Payload => {
            let payload = panel.renderer().payload();
            write_json(&payload, args.pretty)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
