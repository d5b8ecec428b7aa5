use std::env;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use doc_indexer::{BulkArgs, Cli, Commands, Dependencies, IndexingError};
use doc_indexer_pipeline::RunReport;

const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL_FAILURE: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Bulk(args) => run_bulk(&cli.opensearch_url, args).await,
    };

    match result {
        Ok(report) => {
            println!("{}", report.summary());
            let _ = std::io::stdout().flush();
            exit_code(&report)
        }
        Err(e) => {
            error!(error = %e, "Indexing failed");
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Logs go to stderr; stdout carries only the final summary.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().with_ansi(false).init();
    } else {
        builder.init();
    }
}

async fn run_bulk(opensearch_url: &str, args: &BulkArgs) -> Result<RunReport, IndexingError> {
    let dependencies = Dependencies::new(opensearch_url, args).await?;
    let orchestrator = dependencies.orchestrator;

    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C, finishing in-flight batches");
            let _ = shutdown.send(());
        }
    });

    info!(index = %args.index, "Reading documents from stdin");
    let report = orchestrator.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(report)
}

fn exit_code(report: &RunReport) -> ExitCode {
    if report.cancelled {
        ExitCode::from(EXIT_CANCELLED)
    } else if report.input_error.is_some() {
        ExitCode::from(EXIT_FATAL)
    } else if report.stats.has_failures() {
        ExitCode::from(EXIT_PARTIAL_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}
