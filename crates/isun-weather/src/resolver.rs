//! Cache-aside resolution of which requested cities the service can serve.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use isun_core::ConfigError;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;

use crate::client::WeatherApi;
use crate::error::WeatherError;
use crate::types::City;

const TTL_SETTING: &str = "application.available_city_cache_ttl_seconds";

/// Deadline used when `now + ttl` is not representable (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug)]
struct CacheEntry {
    /// The request this entry answers
    requested: HashSet<City>,
    /// `requested` ∩ cities reported by the service
    supported: HashSet<City>,
    expires_at: Instant,
}

impl CacheEntry {
    fn answers(&self, requested: &HashSet<City>, now: Instant) -> bool {
        now < self.expires_at && &self.requested == requested
    }
}

/// Time-bounded cache of the supported subset of the requested cities.
///
/// The entry lives behind an async mutex that is held for the whole refresh,
/// so callers racing past expiry share a single `list_available_cities` call.
pub struct CityResolver {
    api: Arc<dyn WeatherApi>,
    entry: Mutex<Option<CacheEntry>>,
}

impl CityResolver {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            entry: Mutex::new(None),
        }
    }

    /// Return the subset of `requested` the service currently supports.
    ///
    /// `ttl` is the cache lifetime; `None` or zero is a configuration error
    /// reported before any network call. Remote failures propagate unchanged
    /// and leave the cache as it was.
    #[instrument(skip_all, fields(requested = requested.len()))]
    pub async fn resolve(
        &self,
        requested: &HashSet<City>,
        ttl: Option<Duration>,
    ) -> Result<HashSet<City>, WeatherError> {
        let ttl = ttl.ok_or_else(|| ConfigError::MissingSetting(TTL_SETTING.to_string()))?;
        if ttl.is_zero() {
            return Err(
                ConfigError::Invalid(format!("{} must be greater than 0", TTL_SETTING)).into(),
            );
        }

        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.answers(requested, Instant::now()) {
                tracing::debug!("Serving {} cities from cache", cached.supported.len());
                return Ok(cached.supported.clone());
            }
        }

        tracing::info!("Refreshing available city cache");
        let available = self.api.list_available_cities().await?;
        let supported = intersect(requested, &available);

        let now = Instant::now();
        *entry = Some(CacheEntry {
            requested: requested.clone(),
            supported: supported.clone(),
            expires_at: now.checked_add(ttl).unwrap_or(now + FAR_FUTURE),
        });

        Ok(supported)
    }
}

/// Cities of `requested` that `available` contains, in the requested spelling.
pub fn intersect(requested: &HashSet<City>, available: &HashSet<City>) -> HashSet<City> {
    requested
        .iter()
        .filter(|city| available.contains(*city))
        .cloned()
        .collect()
}
