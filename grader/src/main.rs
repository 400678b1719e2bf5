mod pipeline_file;
mod report_text;

use anyhow::{Context, Result};
use clap::Parser;
use pipeline_file::PipelineFile;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::rolling;
use util::config;
use util::paths::ensure_parent_dir;

/// Grade a submission with the scorers listed in a pipeline file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Pipeline description (JSON)
    #[arg(long, short)]
    config: PathBuf,
    /// Print a human-readable summary instead of JSON
    #[arg(long)]
    text: bool,
    /// Write the report to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Grading aborted: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!(
        "Starting {} ({}) with {}",
        config::project_name(),
        config::app_env(),
        cli.config.display()
    );
    let file = PipelineFile::load(&cli.config)?;
    let pipeline = file.into_pipeline()?;
    let report = pipeline.run().await?;

    let rendered = if cli.text {
        report_text::render(&report)
    } else {
        serde_json::to_string_pretty(&report).context("serializing report")?
    };

    match &cli.output {
        Some(path) => {
            ensure_parent_dir(path)
                .with_context(|| format!("creating directory for {}", path.display()))?;
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    // stdout carries the report, so console logs go to stderr
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(console_layer).init();
    } else {
        registry.init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["grader", "--config", "p.json", "--text", "-o", "out.txt"]);
        assert_eq!(cli.config, PathBuf::from("p.json"));
        assert!(cli.text);
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_config_flag_is_required() {
        assert!(Cli::try_parse_from(["grader", "--text"]).is_err());
    }
}
