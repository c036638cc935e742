// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Garmin sync daemon.
//!
//! Runs the reconciliation once (`--once` / `RUN_MODE=once`) or on a fixed
//! interval until interrupted. A run in progress always completes before a
//! Ctrl-C takes effect at the next loop boundary.

use clap::Parser;
use strava_garmin_sync::{
    config::{Config, RunMode},
    services::{GarminApi, GarminClient, GarminFetcher, StravaApi, StravaService, SyncCoordinator},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "strava-garmin-sync",
    about = "Sync Strava activity names and descriptions from Garmin Connect"
)]
struct Cli {
    /// Run a single sync cycle and exit.
    #[arg(long)]
    once: bool,

    /// Simulate Strava updates without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Look-back window in days.
    #[arg(long)]
    sync_days: Option<i64>,

    /// Minutes between scheduled runs.
    #[arg(long)]
    interval_minutes: Option<u64>,
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "Configuration error");
            std::process::exit(1);
        }
    };
    if cli.once {
        config.run_mode = RunMode::Once;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(days) = cli.sync_days {
        config.sync_days = days;
    }
    if let Some(minutes) = cli.interval_minutes {
        config.interval_minutes = minutes;
    }

    tracing::info!(
        days = config.sync_days,
        dry_run = config.dry_run,
        "Starting Strava-Garmin sync"
    );

    let strava = StravaService::new(&config);
    let garmin = GarminFetcher::new(GarminClient::new(&config.garmin_tokens_dir));
    let mut coordinator = SyncCoordinator::new(config.clone(), strava, garmin);

    match config.run_mode {
        RunMode::Once => {
            if let Err(err) = coordinator.run().await {
                tracing::error!(%err, "Sync run failed");
                std::process::exit(1);
            }
        }
        RunMode::Scheduler => run_scheduler(&mut coordinator, config.interval_minutes).await,
    }
}

/// Recurring mode: immediate first run, then one run per interval.
/// Run failures are logged and the loop continues; the next run starts
/// fresh. Ctrl-C is observed between runs only.
async fn run_scheduler<S: StravaApi, G: GarminApi>(
    coordinator: &mut SyncCoordinator<S, G>,
    interval_minutes: u64,
) {
    tracing::info!(interval_minutes, "Scheduler started");

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_minutes * 60));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut shutdown = Box::pin(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping scheduler");
                break;
            }
        }

        if let Err(err) = coordinator.run().await {
            tracing::error!(%err, "Sync run failed, will retry at next interval");
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_garmin_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
