//! CLI argument parsing and command dispatch

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use websim_core::{
    parse_duration, RandomSource, RunConfig, SchedulerBuilder, TracingEventSink, Transport,
};
use websim_data::StaticTargetSource;
use websim_transports::HttpTransport;

#[derive(Parser)]
#[command(name = "websim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run traffic generation
    Run {
        /// Path to a JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Total run time, e.g. 45s, 30m, 2h (bare numbers are minutes)
        #[arg(short, long)]
        duration: Option<String>,
        /// Target sessions per minute
        #[arg(long)]
        rpm: Option<u32>,
        /// Maximum concurrent sessions
        #[arg(long)]
        concurrency: Option<usize>,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Disable compromised-host simulation
        #[arg(long)]
        no_compromised: bool,
        /// Disable malicious traffic simulation
        #[arg(long)]
        no_malicious: bool,
        /// Actually transmit compromise and attack payloads (clears dry-run)
        #[arg(long)]
        live_fire: bool,
        /// Benign site list file, one URL per line (# for comments)
        #[arg(long)]
        sites: Option<PathBuf>,
    },
    /// Probe a sample of benign destinations and report how many respond
    Test {
        /// Benign site list file, one URL per line (# for comments)
        #[arg(long)]
        sites: Option<PathBuf>,
        /// How many destinations to probe
        #[arg(long, default_value_t = 15)]
        count: usize,
    },
    /// Write a default configuration file
    CreateConfig {
        /// Output path
        #[arg(default_value = "websim.json")]
        path: PathBuf,
    },
}

/// Execute the parsed command
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            duration,
            rpm,
            concurrency,
            seed,
            no_compromised,
            no_malicious,
            live_fire,
            sites,
        } => {
            let config = build_config(
                config.as_deref(),
                duration.as_deref(),
                rpm,
                concurrency,
                seed,
                no_compromised,
                no_malicious,
                live_fire,
            )?;
            cmd_run(config, sites.as_deref()).await
        }
        Commands::Test { sites, count } => cmd_test(sites.as_deref(), count).await,
        Commands::CreateConfig { path } => cmd_create_config(&path),
    }
}

/// Merge the config file (or defaults) with command-line overrides.
#[allow(clippy::too_many_arguments)]
fn build_config(
    config_path: Option<&Path>,
    duration: Option<&str>,
    rpm: Option<u32>,
    concurrency: Option<usize>,
    seed: Option<u64>,
    no_compromised: bool,
    no_malicious: bool,
    live_fire: bool,
) -> Result<RunConfig> {
    let mut config = match config_path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(duration) = duration {
        config.duration = parse_duration(duration)?;
    }
    if let Some(rpm) = rpm {
        config.requests_per_minute = rpm;
    }
    if let Some(concurrency) = concurrency {
        config.concurrency = concurrency;
    }
    if let Some(seed) = seed {
        config.rng_seed = Some(seed);
    }
    if no_compromised {
        config.enable_compromised = false;
    }
    if no_malicious {
        config.enable_malicious = false;
    }
    if live_fire {
        config.dry_run = false;
    }

    config.validate()?;
    Ok(config)
}

fn load_targets(sites: Option<&Path>) -> Result<StaticTargetSource> {
    match sites {
        Some(path) => StaticTargetSource::from_site_file(path)
            .with_context(|| format!("loading site list from {}", path.display())),
        None => Ok(StaticTargetSource::builtin()),
    }
}

async fn cmd_run(config: RunConfig, sites: Option<&Path>) -> Result<()> {
    if !config.dry_run {
        tracing::warn!(
            "live-fire mode: compromise and attack payloads WILL be transmitted"
        );
    }

    let targets = load_targets(sites)?;
    let transport = HttpTransport::new(config.pacing.timeout())?;
    let run_id = Uuid::new_v4();

    let mut scheduler = SchedulerBuilder::new()
        .config(config.clone())
        .transport(Arc::new(transport))
        .targets(Arc::new(targets))
        .events(Arc::new(TracingEventSink::new(run_id)))
        .run_id(run_id)
        .build()?;

    // Progress over wall-clock run time, in the spirit of the session timer
    let total_secs = config.duration.as_secs();
    let progress = ProgressBar::new(total_secs);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}s")
            .expect("progress template is static")
            .progress_chars("#>-"),
    );
    let ticker = {
        let progress = progress.clone();
        tokio::spawn(async move {
            let started = std::time::Instant::now();
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                progress.set_position(started.elapsed().as_secs().min(total_secs));
            }
        })
    };

    let stats = scheduler.run_with_signal_handling().await?;

    ticker.abort();
    progress.finish_and_clear();

    println!(
        "run complete: {} sessions ({} ok, {} failed), {} security events, {} compromise activities",
        stats.total_requests,
        stats.successful_requests,
        stats.failed_requests,
        stats.security_events,
        stats.compromise_activities,
    );
    Ok(())
}

async fn cmd_test(sites: Option<&Path>, count: usize) -> Result<()> {
    let targets = load_targets(sites)?;
    let transport = HttpTransport::new(Duration::from_secs(10))?;
    let mut rng = RandomSource::from_entropy();

    let sample = targets.sample_benign(rng.rng(), count);
    tracing::info!(count = sample.len(), "testing connectivity to sample destinations");

    let mut reachable = 0;
    for site in &sample {
        match transport.visit(site).await {
            Ok(metrics) if metrics.is_success() => {
                reachable += 1;
                tracing::info!(site = %site, status = metrics.status, "reachable");
            }
            Ok(metrics) => {
                tracing::warn!(site = %site, status = metrics.status, "unexpected status");
            }
            Err(e) => {
                tracing::warn!(site = %site, error = %e, "unreachable");
            }
        }
    }

    println!(
        "connectivity test: {}/{} sites accessible",
        reachable,
        sample.len()
    );
    if reachable == 0 {
        bail!("no test destination reachable; transport unavailable");
    }
    Ok(())
}

fn cmd_create_config(path: &Path) -> Result<()> {
    let config = RunConfig::default();
    let rendered = serde_json::to_string_pretty(&config)?;
    std::fs::write(path, rendered)
        .with_context(|| format!("writing config to {}", path.display()))?;
    println!("wrote default configuration to {}", path.display());
    Ok(())
}
