//! Fetch cycle, forecast storage and the polling scheduler.

pub mod scheduler;
pub mod store;
pub mod weather_service;
pub mod writer;

#[cfg(test)]
mod testing;

pub use scheduler::PollScheduler;
pub use store::{InMemoryRepository, Record, Repository};
pub use weather_service::{WeatherService, NO_WEATHER_NOTICE};
pub use writer::{ConsoleWriter, Writer};
