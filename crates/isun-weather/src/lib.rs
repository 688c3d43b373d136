//! Weather service access for iSun
//!
//! Provides the bearer-token session client for the remote weather service
//! and the cached resolution of which requested cities it can serve.

pub mod client;
pub mod error;
pub mod resolver;
pub mod types;

pub use client::{WeatherApi, WeatherApiClient};
pub use error::WeatherError;
pub use resolver::CityResolver;
pub use types::{City, WeatherForecast};
