//! Shared helpers: a fake LI-COR `data` endpoint and test configuration.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use station_dash::common::AppState;
use station_dash::config::Config;
use station_dash::licor::LicorClient;

pub const TOKEN: &str = "test-token";
pub const LOGGER: &str = "21234567";

/// One request seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub authorization: String,
    pub query: HashMap<String, String>,
}

struct Upstream {
    response: Mutex<(StatusCode, Value)>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<Captured>>,
}

pub struct FakeLicor {
    pub base_url: String,
    upstream: Arc<Upstream>,
}

impl FakeLicor {
    /// Bind on an ephemeral port and serve `/v1/data` until the runtime stops.
    pub async fn start() -> Self {
        let upstream = Arc::new(Upstream {
            response: Mutex::new((StatusCode::OK, json!({ "data": [] }))),
            delay: Mutex::new(Duration::ZERO),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/data", get(data))
            .with_state(Arc::clone(&upstream));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1/data"),
            upstream,
        }
    }

    pub fn respond(&self, status: StatusCode, body: Value) {
        *self.upstream.response.lock().unwrap() = (status, body);
    }

    pub fn delay(&self, delay: Duration) {
        *self.upstream.delay.lock().unwrap() = delay;
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.upstream.requests.lock().unwrap().clone()
    }

    /// Config pointing at this upstream, with `extra` overrides.
    pub fn config(&self, extra: &[(&str, &str)]) -> Config {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("LICOR_BASE_URL".to_string(), self.base_url.clone()),
            ("LICOR_API_TOKEN".to_string(), TOKEN.to_string()),
            ("LICOR_LOGGER_SN".to_string(), LOGGER.to_string()),
            ("LICOR_REQUEST_TIMEOUT_SECONDS".to_string(), "5".to_string()),
            ("DISABLE_RATE_LIMITING".to_string(), "true".to_string()),
        ]);
        for (k, v) in extra {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    pub fn app_state(&self, extra: &[(&str, &str)]) -> AppState {
        let config = self.config(extra);
        let client = LicorClient::new(&config).unwrap();
        AppState::new(config, client).unwrap()
    }
}

async fn data(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    upstream.requests.lock().unwrap().push(Captured {
        authorization,
        query,
    });

    let delay = *upstream.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = upstream.response.lock().unwrap().clone();
    (status, Json(body))
}

/// A `data` payload from `(timestamp, label, value)` triples.
pub fn payload(readings: &[(&str, &str, &str)]) -> Value {
    let data: Vec<Value> = readings
        .iter()
        .map(|(timestamp, label, value)| {
            json!({
                "timestamp": timestamp,
                "sensor_measurement_type": label,
                "value": value,
            })
        })
        .collect();
    json!({ "data": data, "max_results": false, "message": "" })
}

/// Two composite records, the later one with wind.
pub fn sample_payload() -> Value {
    payload(&[
        ("2025-06-01 10:05:00", "Temperature", "21.5"),
        ("2025-06-01 10:05:00", "Wind Speed", "3"),
        ("2025-06-01 10:05:00", "Wind Direction", "90"),
        ("2025-06-01 10:00:00", "Temperature", "20.0"),
        ("2025-06-01 10:00:00", "RH", "55"),
        ("2025-06-01 10:00:00", "Leaf Wetness", "1"),
    ])
}
