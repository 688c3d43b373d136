//! End-to-end fetch cycles against a mock weather service.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use isun_core::{ApplicationConfig, ConsoleConfig, WeatherApiConfig};
use isun_services::{InMemoryRepository, PollScheduler, WeatherService, Writer, NO_WEATHER_NOTICE};
use isun_weather::{City, WeatherApi, WeatherApiClient};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CaptureWriter {
    lines: Mutex<Vec<String>>,
}

impl CaptureWriter {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Writer for CaptureWriter {
    fn write(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

fn forecast_json(city: &str, temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "city": city,
        "temperature": temperature,
        "precipitation": 12,
        "windSpeed": 3.5,
        "summary": "Cloudy"
    })
}

fn requested(names: &[&str]) -> HashSet<City> {
    names.iter().map(|n| City::new(*n)).collect()
}

async fn authorized_client(server: &MockServer) -> Arc<WeatherApiClient> {
    let client = WeatherApiClient::new(&WeatherApiConfig {
        base_url: format!("{}/api/", server.uri()),
        user: "isun".to_string(),
        password: "passwrd".to_string(),
        timeout_seconds: 5,
    })
    .unwrap();
    client.authenticate().await.unwrap();
    Arc::new(client)
}

struct Harness {
    repository: Arc<InMemoryRepository<isun_weather::WeatherForecast>>,
    writer: Arc<CaptureWriter>,
    service: Arc<WeatherService>,
}

fn harness(client: Arc<WeatherApiClient>) -> Harness {
    let repository = Arc::new(InMemoryRepository::new());
    let writer = Arc::new(CaptureWriter::default());
    let service = Arc::new(WeatherService::new(
        client,
        repository.clone(),
        writer.clone(),
        &ApplicationConfig {
            available_city_cache_ttl_seconds: Some(600),
        },
    ));

    Harness {
        repository,
        writer,
        service,
    }
}

#[tokio::test]
async fn test_two_cycles_share_city_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cities"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!(["Vilnius", "Riga", "Tallinn"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/weathers/Vilnius"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("Vilnius", 18.0)))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(authorized_client(&server).await);
    let cities = requested(&["Vilnius", "Kaunas"]);

    assert_eq!(h.service.fetch_weather(&cities).await.unwrap(), 1);
    assert_eq!(h.service.fetch_weather(&cities).await.unwrap(), 1);

    assert_eq!(h.repository.len(), 2);
    assert_eq!(
        h.writer.lines(),
        vec![
            "City: Vilnius, Temperature: 18, Precipitation: 12, WindSpeed: 3.5, Summary: Cloudy".to_string();
            2
        ]
    );
}

#[tokio::test]
async fn test_expired_token_is_renewed_mid_cycle() {
    let server = MockServer::start().await;

    // First authorization hands out a token the service later rejects
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "stale"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cities"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cities"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["Riga"])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/weathers/riga"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("Riga", 9.5)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(authorized_client(&server).await);

    let emitted = h.service.fetch_weather(&requested(&["riga"])).await.unwrap();

    assert_eq!(emitted, 1);
    assert_eq!(h.repository.len(), 1);
    assert_eq!(h.writer.lines().len(), 1);
}

#[tokio::test]
async fn test_scheduler_prints_notice_for_unsupported_cities() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t1"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["Tokyo"])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(authorized_client(&server).await);
    let scheduler = PollScheduler::new(
        h.service.clone(),
        requested(&["Paris"]),
        &ConsoleConfig {
            delay_between_weather_fetch_seconds: Some(3600),
        },
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    // Wait for the immediate first cycle to finish
    for _ in 0..100 {
        if !h.writer.lines().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    cancel.cancel();

    assert_eq!(handle.await.unwrap(), 1);
    assert_eq!(h.writer.lines(), vec![NO_WEATHER_NOTICE.to_string()]);
    assert!(h.repository.is_empty());
}
