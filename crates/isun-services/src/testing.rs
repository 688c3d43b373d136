//! Test doubles shared by the unit tests of this crate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use isun_core::RemoteCallError;
use isun_weather::{City, WeatherApi, WeatherError, WeatherForecast};
use parking_lot::Mutex;

use crate::writer::Writer;

pub fn cities(names: &[&str]) -> HashSet<City> {
    names.iter().map(|n| City::new(*n)).collect()
}

pub fn forecast_for(city: &str) -> WeatherForecast {
    WeatherForecast {
        city: city.to_string(),
        temperature: 20.0,
        precipitation: 5.0,
        wind_speed: 3.0,
        summary: format!("Nice in {}", city),
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub available: Mutex<HashSet<City>>,
    pub failing_city: Mutex<Option<City>>,
    pub fail_list: AtomicBool,
    pub forecast_latency: Duration,
    pub list_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new(available: &[&str]) -> Self {
        Self {
            available: Mutex::new(cities(available)),
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherApi for FakeApi {
    async fn authenticate(&self) -> Result<(), WeatherError> {
        Ok(())
    }

    async fn list_available_cities(&self) -> Result<HashSet<City>, WeatherError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RemoteCallError::Timeout.into());
        }
        Ok(self.available.lock().clone())
    }

    async fn get_forecast(&self, city: &City) -> Result<WeatherForecast, WeatherError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.forecast_latency.is_zero() {
            tokio::time::sleep(self.forecast_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_city.lock().as_ref() == Some(city) {
            return Err(RemoteCallError::Status {
                endpoint: format!("weathers/{}", city),
                status: 500,
                message: "boom".to_string(),
            }
            .into());
        }
        Ok(forecast_for(city.name()))
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingWriter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Writer for RecordingWriter {
    fn write(&self, text: &str) {
        self.lines.lock().push(text.to_string());
    }
}
