mod app;
mod engine;
mod fields;
mod layout;
mod ternary;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::engine::{EngineClient, EngineRequest};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the model-checking engine.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    engine_url: String,

    /// Timeout for a single engine request, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Advance verification by one step instead of only fetching the current state space.
    #[arg(long)]
    step_on_start: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client = EngineClient::new(&args.engine_url, Duration::from_secs(args.timeout_secs))
        .context("failed to set up the engine client")?;
    let initial_request = if args.step_on_start {
        EngineRequest::StepVerification
    } else {
        EngineRequest::Content
    };
    info!(
        engine = client.base_url(),
        request = initial_request.label(),
        "starting viewer"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "statespace-viewer",
        options,
        Box::new(move |cc| Ok(Box::new(app::ViewerApp::new(cc, client, initial_request)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
