use anyhow::{Context, Result};
use asos_processor::BatchProcessor;
use asos_processor::cli::Args;
use clap::Parser;
use colored::*;
use std::process;

fn main() {
    let args = Args::parse();

    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Processing interrupted by user"))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.to_config().context("Invalid command line options")?;

    let mut processor = BatchProcessor::new(args.input_path.clone(), args.output_path.clone())?
        .with_config(config);
    let stats = processor
        .process()
        .await
        .with_context(|| format!("Failed to process {}", args.input_path.display()))?;

    if stats.stations_written > 0 {
        println!(
            "\n{} {}",
            "Output written to".bright_green(),
            processor.output_dir().display()
        );
    }
    if stats.files_failed > 0 {
        anyhow::bail!("{} batch(es) could not be processed", stats.files_failed);
    }
    Ok(())
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("asos_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
