use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use weather_core::{
    ArtifactStore, MemoryStore, OpenMeteoProvider,
    config::{ServerConfig, UpstreamConfig},
    provider::DAILY_VARIABLES,
};
use weather_server::{AppState, startup::App};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const ARCHIVE_PATH: &str = "/v1/archive";

pub struct TestHelper {
    pub address: String,
    pub client: reqwest::Client,
    pub upstream: MockServer,
    pub store: Arc<dyn ArtifactStore>,
}

impl TestHelper {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(MemoryStore::default())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn ArtifactStore>) -> Self {
        let upstream = MockServer::start().await;

        let provider = OpenMeteoProvider::new(&UpstreamConfig {
            base_url: format!("{}{ARCHIVE_PATH}", upstream.uri()),
            timeout_secs: 2,
        })
        .unwrap();

        let server = ServerConfig { host: "127.0.0.1".into(), port: 0, workers: Some(1) };
        let app = App::with_state(&server, AppState::new(Arc::new(provider), store.clone()))
            .unwrap();
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async { app.run().await.unwrap() });

        TestHelper { address, client: reqwest::Client::new(), upstream, store }
    }

    /// Serve `body` for every archive request.
    pub async fn mock_upstream(&self, status: u16, body: impl Into<String>) {
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.into()))
            .mount(&self.upstream)
            .await;
    }

    /// Fail the test if the provider is called at all.
    pub async fn forbid_upstream(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&self.upstream)
            .await;
    }

    pub async fn store(&self, body: &Value) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}/store-weather-data", self.address))
            .json(body)
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }

    pub async fn get(&self, route: &str) -> (u16, String) {
        let res = self.client.get(format!("{}{route}", self.address)).send().await.unwrap();
        let status = res.status().as_u16();
        (status, res.text().await.unwrap())
    }

    pub async fn get_json(&self, route: &str) -> (u16, Value) {
        let (status, body) = self.get(route).await;
        (status, serde_json::from_str(&body).unwrap())
    }
}

pub fn query(latitude: f64, longitude: f64, start_date: &str, end_date: &str) -> Value {
    json!({
        "latitude": latitude,
        "longitude": longitude,
        "start_date": start_date,
        "end_date": end_date,
    })
}

/// An archive response covering `days` days from `start`, pretty-printed so
/// whitespace changes would be noticed.
pub fn archive_body(start: &str, days: i64) -> String {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let time: Vec<String> =
        (0..days).map(|i| (start + Duration::days(i)).format("%Y-%m-%d").to_string()).collect();

    let mut daily = Map::new();
    daily.insert("time".into(), json!(time));
    for variable in DAILY_VARIABLES {
        let values: Vec<f64> = (0..days).map(|i| i as f64 * 0.5 - 3.0).collect();
        daily.insert(variable.into(), json!(values));
    }

    serde_json::to_string_pretty(&json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "timezone": "GMT",
        "daily": daily,
    }))
    .unwrap()
}
