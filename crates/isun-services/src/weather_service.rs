//! One fetch cycle: resolve the servable cities, fetch, store and print.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use isun_core::ApplicationConfig;
use isun_weather::{City, CityResolver, WeatherApi, WeatherError, WeatherForecast};
use tracing::instrument;
use uuid::Uuid;

use crate::store::Repository;
use crate::writer::Writer;

/// Emitted instead of forecasts when none of the requested cities is served.
pub const NO_WEATHER_NOTICE: &str = "No weather is available for the passed cities.";

pub struct WeatherService {
    api: Arc<dyn WeatherApi>,
    resolver: CityResolver,
    repository: Arc<dyn Repository<WeatherForecast>>,
    writer: Arc<dyn Writer>,
    cache_ttl: Option<Duration>,
}

impl WeatherService {
    /// The cache lifetime is read from `application` as-is; an unset value
    /// surfaces as a configuration error from each cycle.
    pub fn new(
        api: Arc<dyn WeatherApi>,
        repository: Arc<dyn Repository<WeatherForecast>>,
        writer: Arc<dyn Writer>,
        application: &ApplicationConfig,
    ) -> Self {
        Self {
            resolver: CityResolver::new(api.clone()),
            api,
            repository,
            writer,
            cache_ttl: application
                .available_city_cache_ttl_seconds
                .map(Duration::from_secs),
        }
    }

    /// Run one cycle for `cities` and return how many forecasts were emitted.
    ///
    /// The first failing forecast aborts the rest of the cycle.
    #[instrument(skip_all, fields(cities = cities.len()))]
    pub async fn fetch_weather(&self, cities: &HashSet<City>) -> Result<usize, WeatherError> {
        tracing::info!("Fetching new weather");

        let available = self.resolver.resolve(cities, self.cache_ttl).await?;
        if available.is_empty() {
            self.writer.write(NO_WEATHER_NOTICE);
            return Ok(0);
        }

        for city in &available {
            let forecast = self.api.get_forecast(city).await?;
            let rendering = forecast.to_string();
            self.repository.add(Uuid::new_v4(), forecast);
            self.writer.write(&rendering);
        }

        Ok(available.len())
    }
}
