//! Weather service client with bearer-token session handling.

use std::collections::HashSet;

use async_trait::async_trait;
use isun_core::{AuthError, RemoteCallError, ReqwestErrorExt, WeatherApiConfig};
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{AuthorizeRequest, AuthorizeResponse, City, WeatherForecast};

const AUTHORIZE_ENDPOINT: &str = "authorize";
const CITIES_ENDPOINT: &str = "cities";
const WEATHERS_ENDPOINT: &str = "weathers";
const USER_AGENT: &str = concat!("isun/", env!("CARGO_PKG_VERSION"));

/// Calls the poller needs from the weather service.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Obtain a fresh session token. Never retried.
    async fn authenticate(&self) -> Result<(), WeatherError>;

    /// Every city the service currently reports.
    async fn list_available_cities(&self) -> Result<HashSet<City>, WeatherError>;

    async fn get_forecast(&self, city: &City) -> Result<WeatherForecast, WeatherError>;
}

/// HTTP implementation of [`WeatherApi`].
///
/// Authenticated calls that come back 401 trigger exactly one
/// re-authentication and one reissue; the outcome of the reissue is final.
pub struct WeatherApiClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    token: RwLock<String>,
}

impl WeatherApiClient {
    pub fn new(config: &WeatherApiConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            token: RwLock::new(String::new()),
        })
    }

    /// Whether a session token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        !self.token.read().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send_authorized(&self, endpoint: &str) -> Result<reqwest::Response, RemoteCallError> {
        // Clone so the lock is not held across the request
        let token = self.token.read().clone();

        self.client
            .get(self.url(endpoint))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_remote_call_error)
    }

    async fn get_with_reauthorization<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, WeatherError> {
        let mut response = self.send_authorized(endpoint).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("GET {} was rejected, re-authenticating", endpoint);
            self.authenticate().await?;

            response = self.send_authorized(endpoint).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!("GET {} rejected again after re-authentication", endpoint);
                return Err(RemoteCallError::Unauthorized {
                    endpoint: endpoint.to_string(),
                }
                .into());
            }
        }

        Ok(handle_response(endpoint, response).await?)
    }
}

#[async_trait]
impl WeatherApi for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn authenticate(&self) -> Result<(), WeatherError> {
        tracing::info!("POST {}", AUTHORIZE_ENDPOINT);

        let response = self
            .client
            .post(self.url(AUTHORIZE_ENDPOINT))
            .json(&AuthorizeRequest {
                username: &self.user,
                password: &self.password,
            })
            .send()
            .await
            .map_err(ReqwestErrorExt::into_auth_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let authorization: AuthorizeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        if authorization.token.is_empty() {
            return Err(AuthError::EmptyToken.into());
        }

        *self.token.write() = authorization.token;
        Ok(())
    }

    #[instrument(skip(self), level = "info")]
    async fn list_available_cities(&self) -> Result<HashSet<City>, WeatherError> {
        tracing::info!("GET {}", CITIES_ENDPOINT);

        let cities: Vec<City> = self.get_with_reauthorization(CITIES_ENDPOINT).await?;
        Ok(cities.into_iter().collect())
    }

    #[instrument(skip(self, city), fields(city = %city), level = "info")]
    async fn get_forecast(&self, city: &City) -> Result<WeatherForecast, WeatherError> {
        tracing::info!("GET {} for {}", WEATHERS_ENDPOINT, city);

        let endpoint = format!(
            "{}/{}",
            WEATHERS_ENDPOINT,
            urlencoding::encode(city.name())
        );
        self.get_with_reauthorization(&endpoint).await
    }
}

/// Decode a successful body or turn the status into a `RemoteCallError`.
async fn handle_response<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, RemoteCallError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| RemoteCallError::InvalidResponse(format!("{}: {}", endpoint, e)))
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(RemoteCallError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        })
    }
}
