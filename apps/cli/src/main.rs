use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    check_health, parse_server_url, ChannelSignal, Phase, SessionController, SseTransport,
    ViewState,
};
use shared::domain::{Subject, INSTRUMENT_CATALOG};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use render::{progress_lines, render_view, TerminalMarkdown};

/// Streams a multi-agent stock analysis and prints its progress.
#[derive(Parser, Debug)]
#[command(name = "analyzer")]
struct Args {
    /// Instrument to analyze; defaults to the configured ticker.
    #[arg(long)]
    ticker: Option<String>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the selectable instruments and exit.
    #[arg(long)]
    list_instruments: bool,
    /// Probe the analysis server and exit.
    #[arg(long)]
    check_health: bool,
}

enum Step {
    Signal(ChannelSignal),
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(server_url) = &args.server_url {
        settings.server_url = config::normalize_server_url(server_url)?;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.list_instruments {
        for instrument in INSTRUMENT_CATALOG {
            println!("{:<6} {}", instrument.symbol, instrument.label);
        }
        return Ok(());
    }

    if args.check_health {
        let url = parse_server_url(&settings.server_url)?;
        let healthy = check_health(&reqwest::Client::new(), &url)
            .await
            .with_context(|| format!("health probe against {url} failed"))?;
        println!("{url}: {}", if healthy { "ok" } else { "not ready" });
        return Ok(());
    }

    let subject = Subject::new(args.ticker.unwrap_or(settings.default_ticker))?;
    if subject.instrument().is_none() {
        warn!(subject = %subject, "instrument is not in the built-in catalog");
    }

    let transport = Arc::new(SseTransport::new(&settings.server_url)?);
    let mut controller = SessionController::new(transport);
    let mut views = controller.subscribe();
    let mut shown = ViewState::default();

    info!(subject = %subject, server_url = %settings.server_url, "starting analysis");
    controller.start(subject);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        if views.has_changed().unwrap_or(false) {
            let next = views.borrow_and_update().clone();
            for line in progress_lines(&shown, &next) {
                println!("{line}");
            }
            shown = ViewState::clone(&next);
        }
        if !controller.phase().is_live() {
            break;
        }

        let step = tokio::select! {
            signal = controller.next_signal() => match signal {
                Some(signal) => Step::Signal(signal),
                None => break,
            },
            _ = &mut ctrl_c => Step::Interrupted,
        };
        match step {
            Step::Signal(signal) => controller.dispatch(signal),
            Step::Interrupted => {
                warn!("interrupted, closing analysis stream");
                controller.shutdown();
                return Ok(());
            }
        }
    }

    println!();
    print!("{}", render_view(&controller.view(), &TerminalMarkdown));

    if controller.phase() == Phase::Failed {
        bail!("analysis did not complete: {}", controller.view().status);
    }
    Ok(())
}
