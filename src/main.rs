//! sonar-inspect - SonarQube results for code review
//!
//! Reads the SonarQube reports of a build workspace, or fetches the issues
//! of a pull-request analysis from the server, and writes a summary.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing report, unreadable report, server failure, etc.)

use anyhow::{Context, Result};
use sonar_inspect::cli::{Args, OutputFormat};
use sonar_inspect::config::{Config, CONFIG_FILE_NAME};
use sonar_inspect::inspection::{
    FsWorkspace, InterruptHandle, RemoteReportFetcher, SonarConnector, TokioWaiter,
};
use sonar_inspect::report::{generate_json_summary, generate_markdown_summary, IssueSummary};
use sonar_inspect::sonar::{InstallationRegistry, SonarClientFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("sonar-inspect v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_inspection(args).await {
        error!("Inspection failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .sonar-inspect.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to configure installations, sub-jobs and the analysis mode.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Acquire the reports and write the summary.
async fn run_inspection(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    debug!("Inspection config: {:?}", config.inspection);

    let interrupt = InterruptHandle::new();
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received");
                interrupt.interrupt();
            }
        });
    }

    let registry = InstallationRegistry::new(&config.installations)
        .with_fallback_url(&config.inspection.server_url);
    let waiter = TokioWaiter::new(interrupt).with_progress(!args.quiet);
    let remote = RemoteReportFetcher::new(
        registry,
        Arc::new(SonarClientFactory::new(config.client.clone())),
    )
    .with_waiter(Arc::new(waiter));

    let mut connector = SonarConnector::new(config.inspection.clone(), remote)
        .with_root_module(config.build.root_module.clone());

    let workspace = FsWorkspace::new(&args.workspace);
    let report = connector.read_reports(&workspace).await?;

    let output = match args.format {
        OutputFormat::Json => generate_json_summary(report)?,
        OutputFormat::Markdown => generate_markdown_summary(report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            info!("Summary saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    if !args.quiet {
        let summary = IssueSummary::from_issues(report.flat_issues());
        eprintln!("\n📊 Inspection Summary:");
        eprintln!("   Reports: {}", report.len());
        eprintln!("   Total issues: {} ({} new)", summary.total, summary.new_issues);
        eprintln!(
            "   - Blocker: {} | Critical: {} | Major: {} | Minor: {} | Info: {}",
            summary.blocker, summary.critical, summary.major, summary.minor, summary.info
        );
        eprintln!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            return Ok(config);
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to load config: {}", e),
    }

    match Config::load_from_dir(&args.workspace) {
        Ok(Some(config)) => {
            info!("Found {} in workspace", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
