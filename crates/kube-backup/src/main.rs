use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use kube_backup::cli::{Cli, Command, LogFormat};
use kube_backup::plugins::configured_plugins;
use kube_backup::sanitize::{redact_repo_url, redact_token};
use kube_backup::{BackupConfig, BackupRepository, CliClusterClient};

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    // The git layer logs through the `log` facade
    tracing_log::LogTracer::init().context("Failed to install log bridge")?;
    Ok(())
}

fn log_config(config: &BackupConfig) {
    info!(
        repository = %redact_repo_url(&config.git.repository),
        branch = %config.git.branch,
        prefix = %config.git.prefix,
        target = %config.target_path,
        cli = %config.cluster.cli,
        "Starting kube-backup {}",
        env!("CARGO_PKG_VERSION")
    );
    if config.grafana.enabled() {
        info!(
            url = %config.grafana.url,
            token = %redact_token(config.grafana.token_insecure.as_deref().unwrap_or("")),
            "Grafana mirror enabled"
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let config = cli.build_config().context("Invalid configuration")?;
    log_config(&config);

    let repository = BackupRepository::new(&config.target_path, config.git.clone());

    if matches!(cli.command(), Command::Backup | Command::Run) {
        let cluster = CliClusterClient::new(&config.cluster.cli);
        let plugins = configured_plugins(&config)?;
        let report = kube_backup::backup(&config, &cluster, &repository, &plugins)?;
        info!(
            written = report.written,
            skipped = report.skipped,
            failed_plugins = ?report.failed_plugins,
            "Backup finished"
        );
    }

    if matches!(cli.command(), Command::Push | Command::Run) {
        match kube_backup::push(&repository, &config.git.prefix)? {
            Some(summary) => info!("Pushed: {}", summary.message),
            None => info!("Nothing to push"),
        }
    }

    Ok(())
}
