use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A city as named by the user or the weather service.
///
/// Identity ignores letter case: `City::new("Paris") == City::new("PARIS")`,
/// and both hash alike. The original spelling is kept for requests and output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct City {
    name: String,
}

impl City {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.name.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for City {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for City {}

impl Hash for City {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // must agree with eq: hash the case-folded characters only
        for c in self.folded() {
            c.hash(state);
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for City {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for City {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Forecast payload returned by `GET weathers/{city}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub city: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub precipitation: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub summary: String,
}

impl fmt::Display for WeatherForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "City: {}, Temperature: {}, Precipitation: {}, WindSpeed: {}, Summary: {}",
            self.city, self.temperature, self.precipitation, self.wind_speed, self.summary
        )
    }
}

/// Body of `POST authorize`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthorizeRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST authorize`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthorizeResponse {
    pub token: String,
}
