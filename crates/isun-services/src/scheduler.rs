//! Periodic driver for fetch cycles.
//!
//! Every tick spawns a cycle as its own task and immediately waits for the
//! next tick. Cycles may therefore overlap when one takes longer than the
//! interval. Cancellation stops the ticking only; cycles already started run
//! to completion on their own.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use isun_core::{ConfigError, ConsoleConfig};
use isun_weather::City;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::weather_service::WeatherService;

pub struct PollScheduler {
    service: Arc<WeatherService>,
    cities: Arc<HashSet<City>>,
    interval: Duration,
}

impl PollScheduler {
    /// Fails fast when the poll interval is unset or zero.
    pub fn new(
        service: Arc<WeatherService>,
        cities: HashSet<City>,
        console: &ConsoleConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            service,
            cities: Arc::new(cities),
            interval: console.poll_interval()?,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick until `cancel` fires. Returns the number of cycles started.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        tracing::info!(
            "Starting weather polling every {:?} for {} cities",
            self.interval,
            self.cities.len()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut started: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("Polling stopped after {} cycles", started);
                    break;
                }
                _ = ticker.tick() => {
                    started += 1;
                    self.spawn_cycle(started);
                }
            }
        }

        started
    }

    fn spawn_cycle(&self, cycle: u64) {
        let service = self.service.clone();
        let cities = self.cities.clone();

        // Detached: the scheduler neither awaits nor cancels a cycle
        tokio::spawn(async move {
            match service.fetch_weather(&cities).await {
                Ok(emitted) => {
                    tracing::debug!("Cycle {} emitted {} forecasts", cycle, emitted);
                }
                Err(e) => {
                    tracing::error!("Cycle {} failed: {}", cycle, e);
                }
            }
        });
    }
}
