//! Command-line arguments.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use isun_weather::City;
use thiserror::Error;

/// Print weather forecasts for a set of cities on a fixed interval
#[derive(Parser, Debug)]
#[command(name = "isun", author, version, about, long_about = None)]
pub struct Cli {
    /// Cities to report on, separated by spaces and/or commas
    #[arg(long, required = true, num_args = 1..)]
    pub cities: Vec<String>,

    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("--cities must name at least one city")]
    NoCities,
}

impl Cli {
    /// The requested cities, split and de-duplicated.
    pub fn city_list(&self) -> Result<Vec<City>, CliError> {
        parse_cities(&self.cities)
    }
}

/// Split raw `--cities` values on spaces and commas.
///
/// Empty fragments are dropped. Duplicates collapse ignoring case, and the
/// first spelling seen is the one kept.
pub fn parse_cities(raw: &[String]) -> Result<Vec<City>, CliError> {
    let mut seen = HashSet::new();
    let cities: Vec<City> = raw
        .iter()
        .flat_map(|value| value.split([' ', ',']))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(City::new)
        .filter(|city| seen.insert(city.clone()))
        .collect();

    if cities.is_empty() {
        return Err(CliError::NoCities);
    }
    Ok(cities)
}
