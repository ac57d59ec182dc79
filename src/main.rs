//! Binary entrypoint for filter-workflow.
//!
//! Runs a scripted session from a YAML file and exports the canvas, prints the
//! planned draw calls, or keeps reading commands from stdin.

use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use filter_workflow::config::Configuration;
use filter_workflow::events::UiEvent;
use filter_workflow::render::raster::RasterSurface;
use filter_workflow::render::text::TextRenderer;
use filter_workflow::surface::{CANVAS_HEIGHT, CANVAS_WIDTH, RecordingSurface, Surface};
use filter_workflow::tasks::commands::spawn_command_reader;
use filter_workflow::tasks::coordinator::Coordinator;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "filter-workflow",
    version,
    about = "Apply image filters to templated layouts and export the result"
)]
struct Args {
    /// Path to YAML session file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Write exported PNGs here instead of the configured output-dir
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Keep reading commands from stdin after the scripted steps
    #[arg(long)]
    interactive: bool,
    /// Print the draw calls instead of rendering pixels
    #[arg(long)]
    plan: bool,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG wins; otherwise map -v to a level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,filter_workflow={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        output_dir,
        interactive,
        plan,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let mut cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    debug!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    if plan {
        let mut coordinator = Coordinator::new(RecordingSurface::default(), &cfg.output_dir);
        run_session(&mut coordinator, &cfg).await;
        if interactive {
            run_interactive(&mut coordinator, cfg.frame_interval()).await?;
        }
        for command in coordinator.surface().commands() {
            println!("{command}");
        }
        return Ok(());
    }

    let text = load_text(cfg.font.as_deref());
    let surface = RasterSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT, text);
    let mut coordinator = Coordinator::new(surface, &cfg.output_dir);
    run_session(&mut coordinator, &cfg).await;

    if interactive {
        run_interactive(&mut coordinator, cfg.frame_interval()).await?;
        return Ok(());
    }

    if let Some(path) = coordinator.export().context("failed to export canvas")? {
        println!("{}", path.display());
    }
    Ok(())
}

fn load_text(font: Option<&Path>) -> Option<TextRenderer> {
    let loaded = match font {
        Some(path) => TextRenderer::from_file(path),
        None => TextRenderer::from_system(),
    };
    match loaded {
        Ok(text) => Some(text),
        Err(err) => {
            warn!("{err}; placeholder text will not be drawn");
            None
        }
    }
}

/// Replays the configured session: uploads, template, filter controls, frames, apply.
async fn run_session<S: Surface>(coordinator: &mut Coordinator<S>, cfg: &Configuration) {
    let files = cfg.selected_files();
    if !files.is_empty() {
        let accepted = coordinator.upload(files);
        info!(accepted, "uploading images");
        coordinator.settle().await;
    }

    for event in cfg.control_events() {
        coordinator.handle(event);
        coordinator.settle().await;
    }

    for _ in 0..cfg.advance_frames {
        coordinator.tick();
    }

    if cfg.should_apply() {
        coordinator.apply_all_filters();
    }
}

async fn run_interactive<S: Surface>(
    coordinator: &mut Coordinator<S>,
    frame_interval: Duration,
) -> Result<()> {
    let (events_tx, events_rx) = mpsc::channel::<UiEvent>(32);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; shutting down");
            cancel.cancel();
        });
    }

    // Runs on its own thread; a pending stdin read must not block runtime shutdown.
    spawn_command_reader(BufReader::new(io::stdin()), events_tx)
        .context("failed to start stdin command reader")?;

    coordinator.run(events_rx, cancel, frame_interval).await;
    Ok(())
}
