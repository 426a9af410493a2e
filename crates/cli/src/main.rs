//! `typefast-preview` -- run one script preview against a routine runner.
//!
//! Persists the script, schedules it on the preview queue and streams the
//! routine log to stdout until the runner reports completion. Ctrl-C stops
//! polling.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                  |
//! |---------------------------------|----------|--------------------------|
//! | `TYPEFAST_API_URL`              | no       | `http://localhost:8080/` |
//! | `TYPEFAST_ACCESS_TOKEN`         | yes      | --                       |
//! | `TYPEFAST_POLL_INTERVAL_MS`     | no       | `1000`                   |
//! | `TYPEFAST_REQUEST_TIMEOUT_SECS` | no       | `30`                     |
//!
//! Exit status is 0 on completion, 1 on failure and 130 when interrupted.

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use typefast_client::{
    ApiError, ClientConfig, ConfigError, HttpTransport, RequestBuilder, RoutineApi, Session,
};
use typefast_core::Script;
use typefast_events::{ActionBus, ActionDispatcher};
use typefast_pipeline::{PollOutcome, PreviewError, PreviewPipeline};

const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "typefast-preview")]
#[command(version)]
#[command(about = "Run a script preview and stream its log", long_about = None)]
struct Cli {
    /// File containing the script source
    script_file: PathBuf,
    /// Update this existing script instead of creating a new one
    #[arg(long)]
    script_id: Option<String>,
    /// Script title
    #[arg(long)]
    title: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadScript {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ApiError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typefast_cli=info,typefast_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Preview failed");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    let code = tokio::fs::read_to_string(&cli.script_file)
        .await
        .map_err(|source| CliError::ReadScript {
            path: cli.script_file.clone(),
            source,
        })?;

    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting typefast-preview",
    );

    let bus = ActionBus::default();
    let printer = tokio::spawn(output::print_progress(bus.subscribe()));
    let dispatcher: Arc<dyn ActionDispatcher> = Arc::new(bus);

    let transport = HttpTransport::new(config.request_timeout)?;
    let session = Session::new(config.access_token.clone());
    let builder = RequestBuilder::new(config.api_url.clone(), session);
    let api = Arc::new(RoutineApi::new(transport, builder, Arc::clone(&dispatcher)));
    let pipeline =
        Arc::new(PreviewPipeline::new(api, dispatcher).with_poll_interval(config.poll_interval));

    let mut script = Script::new(code).with_title(cli.title.unwrap_or_default());
    if let Some(id) = cli.script_id {
        script = script.with_id(id);
    }

    let handle = pipeline.spawn(script);
    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping preview");
            cancel.cancel();
        }
    });

    let result = handle.join().await;
    interrupt.abort();

    // The bus closes once the pipeline is gone; wait for the last log lines.
    let _ = printer.await;

    match result?.poll {
        PollOutcome::Completed(_) => {
            tracing::info!("Preview completed");
            Ok(0)
        }
        PollOutcome::Cancelled => Ok(EXIT_INTERRUPTED),
    }
}
