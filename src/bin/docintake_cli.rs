//! Operator CLI.
//!
//! `process` re-runs intake for a single object, which is the manual recovery path for events
//! that were acknowledged but failed. `replay` does the same for a batch on a best-effort basis:
//! failures are logged and counted, and the batch carries on. The other subcommands drive the
//! document tools directly. Every subcommand prints its result as JSON on stdout.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docintake::{
    auth::GcpAuth,
    config::{self, GcpConfig, ToolConfig},
    http, logging,
    intake::{IntakeEvent, IntakeService},
    tools::DocumentTools,
};
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "docintake-cli",
    about = "Run document intake and the document tools from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run intake once for an object that already exists in a bucket.
    Process {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        name: String,
    },
    /// Re-run intake for several objects in one bucket, continuing past failures.
    Replay {
        #[arg(long)]
        bucket: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Upload a local file to the intake bucket.
    Upload { path: PathBuf },
    /// Render a text file as a PDF and upload it.
    Convert {
        path: PathBuf,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Search an account's source documents.
    Search {
        #[arg(long)]
        account: String,
        #[arg(long)]
        query: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing(logging::ConsoleTarget::Stderr);
    let client = http::build_client().context("failed to build HTTP client")?;

    match cli.command {
        Command::Process { bucket, name } => {
            let service = intake_service(client).await?;
            let event = IntakeEvent { bucket, name };
            match service.process(&event).await {
                Ok(outcome) => print_json(&outcome),
                Err(error) => {
                    print_json(&json!({
                        "status": "error",
                        "kind": error.kind(),
                        "retryable": error.is_retryable(),
                        "message": error.to_string(),
                    }))?;
                    bail!("intake failed for gs://{}/{}", event.bucket, event.name);
                }
            }
        }
        Command::Replay { bucket, names } => {
            let service = intake_service(client).await?;
            for name in names {
                let event = IntakeEvent {
                    bucket: bucket.clone(),
                    name,
                };
                service.process_logged(&event).await;
            }
            let snapshot = service.metrics_snapshot();
            print_json(&snapshot)?;
            if snapshot.failures > 0 {
                bail!("{} of {} objects failed", snapshot.failures, snapshot.events_received);
            }
            Ok(())
        }
        Command::Upload { path } => {
            let result = tools(client).await?.upload_document(&path).await;
            print_json(&result)?;
            if !result.is_success() {
                bail!("upload failed");
            }
            Ok(())
        }
        Command::Convert { path, bucket } => {
            let result = tools(client)
                .await?
                .convert_and_upload(&path, bucket.as_deref())
                .await;
            print_json(&result)?;
            if !result.is_success() {
                bail!("conversion failed");
            }
            Ok(())
        }
        Command::Search { account, query } => {
            let results = tools(client)
                .await?
                .search_source_documents(&account, &query)
                .await;
            print_json(&results)
        }
    }
}

async fn intake_service(client: reqwest::Client) -> Result<IntakeService> {
    let config = config::load_config().context("failed to load configuration")?;
    let auth = GcpAuth::from_config(&config.gcp)
        .await
        .context("failed to resolve Google credentials")?;
    IntakeService::from_config(&config.intake, &config.gcp, client, Arc::new(auth))
        .context("failed to initialize intake service")
}

async fn tools(client: reqwest::Client) -> Result<DocumentTools> {
    DocumentTools::connect(&ToolConfig::from_env(), &GcpConfig::from_env(), client)
        .await
        .context("failed to initialize document tools")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
