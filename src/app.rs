//! Wiring from parsed arguments to a running poller.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use isun_core::Config;
use isun_services::{ConsoleWriter, InMemoryRepository, PollScheduler, WeatherService};
use isun_weather::{WeatherApi, WeatherApiClient};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;

/// Load configuration, authenticate and poll until Ctrl-C.
pub async fn run(cli: Cli) -> Result<()> {
    let cities: HashSet<_> = cli.city_list()?.into_iter().collect();

    let (config, validation) = Config::load_validated(cli.config.as_deref())
        .context("Failed to load configuration")?;
    isun_core::init(&config.logging)?;

    // Validation ran before the logger existed
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    tracing::info!(
        "Starting iSun for {} cities against {}",
        cities.len(),
        config.weather_api.base_url
    );

    let client = Arc::new(WeatherApiClient::new(&config.weather_api)?);
    client
        .authenticate()
        .await
        .context("Initial authorization with the weather service failed")?;

    let service = Arc::new(WeatherService::new(
        client,
        Arc::new(InMemoryRepository::new()),
        Arc::new(ConsoleWriter),
        &config.application,
    ));
    let scheduler = PollScheduler::new(service, cities, &config.console)?;

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let cycles = scheduler.run(cancel).await;
    tracing::info!("iSun stopped after {} fetch cycles", cycles);
    Ok(())
}

fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown requested"),
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
        cancel.cancel();
    });
}
