use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gotv_epg::{
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    pipeline,
    sources::HttpGuideSource,
};

#[derive(Parser)]
#[command(name = "gotv-epg")]
#[command(version)]
#[command(about = "Fetches a provider's JSON programme guide and publishes it as XMLTV")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output XML path (overrides config file); the gzip copy gets ".gz" appended
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Force text sanitization on
    #[arg(long)]
    sanitize: bool,

    /// Fetch and transform, but write no files
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = format!("gotv_epg={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    if let Some(output) = cli.output {
        config.output.xml_path = output;
    }
    if cli.sanitize {
        config.transform.sanitize = true;
    }

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    info!("Starting gotv-epg v{}", env!("CARGO_PKG_VERSION"));

    let source = HttpGuideSource::new(&config.source)?;
    let summary = pipeline::run(&config, &source, Utc::now(), cli.dry_run).await?;

    println!("{}", config.output.generator_name);
    println!("{}", "=".repeat(40));
    println!("{summary}");
    Ok(())
}
