//! src/main.rs
//! `crewdeck`: replay a scripted session against a page fixture, or print
//! the effective configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clipport::{ClipboardPort, MemoryClipboard, SecureClipboard};
use serde::Serialize;
use tokio::signal;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, info, info_span, warn};

use crewdeck_core::{
    Config, EventLoop, Logger, Page, PageEffect, PageEvent,
    controller::LoopMetrics,
    model::{SelectionSnapshot, Severity},
    view::{PageFixture, fixture::read_script},
};

#[derive(Debug, Parser)]
#[command(name = "crewdeck", version, about = "Crew admin page behavior engine")]
struct Cli {
    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a scripted event session against a page fixture on a virtual clock
    Replay {
        /// Page fixture (JSON)
        page: PathBuf,
        /// Event script (JSON)
        events: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// One line of replay output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Line<'a> {
    Effect {
        at_ms: u128,
        #[serde(flatten)]
        effect: &'a PageEffect,
    },
    Toast {
        id: String,
        severity: Severity,
        message: &'a str,
    },
    Selection {
        table: String,
        #[serde(flatten)]
        snapshot: SelectionSnapshot,
        ids: Vec<&'a str>,
    },
    Metrics(LoopMetrics),
}

fn emit(line: &Line<'_>) -> Result<()> {
    println!("{}", serde_json::to_string(line)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Config => {
            let text = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{text}");
            Ok(())
        }
        Command::Replay { page, events } => {
            let _guard = Logger::init(&config.logging).context("Failed to initialize logging")?;
            replay(&config, &page, &events).await
        }
    }
}

async fn replay(config: &Config, page_path: &Path, events_path: &Path) -> Result<()> {
    let fixture = PageFixture::read(page_path)
        .await
        .context("Failed to read page fixture")?;
    let script = read_script(events_path)
        .await
        .context("Failed to read event script")?;

    let view = fixture.build();
    let mut scheduled: Vec<(Duration, PageEvent)> = script
        .iter()
        .map(|line| line.event.resolve(&view).map(|event| (line.at, event)))
        .collect::<crewdeck_core::AppResult<_>>()
        .context("Event script does not match the page")?;
    if !scheduled.iter().any(|(_, event)| *event == PageEvent::Loaded) {
        scheduled.insert(0, (Duration::ZERO, PageEvent::Loaded));
    }

    let clipboard = MemoryClipboard::with_mode(fixture.clipboard.clone().into());
    let backend = Arc::new(clipboard);
    let port = if fixture.secure_context {
        let secure: Arc<dyn SecureClipboard> = backend.clone();
        ClipboardPort::new(Some(secure), backend)
    } else {
        ClipboardPort::legacy_only(backend)
    };
    let location = fixture.location().context("Invalid page URL in fixture")?;
    let page = Page::new(view, location, port, config);

    // timers and script offsets run on a virtual clock
    tokio::time::pause();
    let start = Instant::now();

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (effects_tx, mut effects_rx) = mpsc::unbounded_channel();
    let shutdown = Arc::new(Notify::new());

    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            on_signal.notify_one();
        }
    });

    info!("replaying {} event(s) from {}", scheduled.len(), events_path.display());
    let feeder = tokio::spawn(async move {
        for (at, event) in scheduled {
            sleep_until(start + at).await;
            if events_tx.send(event).is_err() {
                warn!("replay: event loop stopped before the script ended");
                break;
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(effect) = effects_rx.recv().await {
            let at_ms = start.elapsed().as_millis();
            if let Err(err) = emit(&Line::Effect {
                at_ms,
                effect: &effect,
            }) {
                warn!("replay: failed to print effect: {err}");
            }
        }
    });

    let (page, metrics) = EventLoop::new(page, events_rx, effects_tx, shutdown)
        .run()
        .instrument(info_span!("replay", page = %page_path.display()))
        .await;
    feeder.await.context("Event feeder panicked")?;
    printer.await.context("Effect printer panicked")?;

    for toast in page.toasts().entries() {
        emit(&Line::Toast {
            id: toast.id.to_string(),
            severity: toast.severity,
            message: &toast.message,
        })?;
    }
    for selection in page.selections() {
        emit(&Line::Selection {
            table: selection.table().to_string(),
            snapshot: selection.machine().snapshot(),
            ids: selection.selected_ids(),
        })?;
    }
    emit(&Line::Metrics(metrics))?;

    info!("replay finished after {:?} of page time", start.elapsed());
    Ok(())
}
