//! HTTP signal API.
//!
//! Serves the latest sample, the rolling history and best/worst-so-far values
//! from a [`SignalMonitor`] that is polled elsewhere (see
//! [`gatewatch_core::spawn_poller`]). Handlers only read; they never trigger
//! a poll.

use std::io;
use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use serde::Serialize;

use gatewatch_core::{
    ExtremaSummary, HISTORY_CAPACITY, MonitorStatus, NormalizedSample, SignalMonitor,
};

/// Shared server state.
struct AppState {
    monitor: Arc<SignalMonitor>,
    model: Option<String>,
}

#[derive(Serialize)]
struct SignalResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample: Option<NormalizedSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    samples: Vec<NormalizedSample>,
    len: usize,
    capacity: usize,
}

#[derive(Serialize)]
struct ExtremaResponse {
    best: ExtremaSummary,
    worst: ExtremaSummary,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    source: String,
    #[serde(flatten)]
    counters: MonitorStatus,
}

async fn handle_signal(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SignalResponse>) {
    match state.monitor.latest() {
        Some(sample) => (
            StatusCode::OK,
            Json(SignalResponse {
                success: true,
                sample: Some(sample),
                error: None,
            }),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(SignalResponse {
                success: false,
                sample: None,
                error: Some("no sample collected yet".to_string()),
            }),
        ),
    }
}

async fn handle_history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let samples: Vec<NormalizedSample> = state.monitor.history().iter().cloned().collect();
    Json(HistoryResponse {
        len: samples.len(),
        samples,
        capacity: HISTORY_CAPACITY,
    })
}

async fn handle_extrema(State(state): State<Arc<AppState>>) -> Json<ExtremaResponse> {
    let view = state.monitor.view();
    Json(ExtremaResponse {
        best: view.best,
        worst: view.worst,
    })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let counters = state.monitor.status();
    Json(HealthResponse {
        status: counters.health(),
        source: state.monitor.source_name().to_string(),
        counters,
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "gatewatch",
        "version": gatewatch_core::VERSION,
        "model": state.model,
        "source": state.monitor.source_name(),
        "endpoints": {
            "/": "This API index",
            "/api/v1/signal": "Latest normalized 4G/5G sample",
            "/api/v1/history": format!("Rolling history (last {HISTORY_CAPACITY} samples, oldest first)"),
            "/api/v1/extrema": "Best and worst RSRP/SNR/RSRQ over the history",
            "/health": "Poller status",
        },
    }))
}

/// Build the axum router.
pub fn build_router(monitor: Arc<SignalMonitor>, model: Option<String>) -> Router {
    let state = Arc::new(AppState { monitor, model });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/signal", get(handle_signal))
        .route("/api/v1/history", get(handle_history))
        .route("/api/v1/extrema", get(handle_extrema))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Serve the signal API until the process is stopped.
pub async fn run_server(
    monitor: Arc<SignalMonitor>,
    model: Option<String>,
    host: &str,
    port: u16,
) -> io::Result<()> {
    let app = build_router(monitor, model);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gatewatch_core::{
        Credential, FetchError, FetchResult, RawCellSignal, RawSignalSnapshot, SignalSource,
    };
    use std::sync::Mutex;

    struct Script(Mutex<Vec<FetchResult<RawSignalSnapshot>>>);

    impl SignalSource for Script {
        fn name(&self) -> &str {
            "script"
        }

        fn fetch(&self, _: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(FetchError::Malformed("done".into())))
        }
    }

    fn snapshot(rsrp: f64) -> RawSignalSnapshot {
        RawSignalSnapshot {
            primary: RawCellSignal {
                rsrp: Some(rsrp),
                sinr: Some(10.0),
                bars: Some(3),
                bands: vec!["b2".into()],
                ..Default::default()
            },
            secondary: RawCellSignal::default(),
        }
    }

    /// `steps` are consumed back to front.
    fn state(steps: Vec<FetchResult<RawSignalSnapshot>>) -> State<Arc<AppState>> {
        let monitor = Arc::new(SignalMonitor::new(Box::new(Script(Mutex::new(steps)))));
        State(Arc::new(AppState {
            monitor,
            model: Some("KVD21".into()),
        }))
    }

    fn to_value<T: Serialize>(body: &T) -> serde_json::Value {
        serde_json::to_value(body).unwrap()
    }

    #[tokio::test]
    async fn signal_is_404_before_first_sample() {
        let (status, Json(body)) = handle_signal(state(vec![])).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let v = to_value(&body);
        assert_eq!(v["success"], false);
        assert!(v["error"].is_string());
        assert!(v.get("sample").is_none());
    }

    #[tokio::test]
    async fn signal_returns_latest() {
        let st = state(vec![Ok(snapshot(-90.0)), Ok(snapshot(-100.0))]);
        st.0.monitor.tick().unwrap();
        st.0.monitor.tick().unwrap();

        let (status, Json(body)) = handle_signal(st).await;
        assert_eq!(status, StatusCode::OK);
        let v = to_value(&body);
        assert_eq!(v["success"], true);
        assert_eq!(v["sample"]["lte"]["rsrp"], -90.0);
        assert_eq!(v["sample"]["lte"]["band"], "B2");
        assert!(v["sample"]["timestamp_ms"].is_u64());
    }

    #[tokio::test]
    async fn history_shape() {
        let st = state(vec![Ok(snapshot(-90.0)), Ok(snapshot(-100.0))]);
        st.0.monitor.tick().unwrap();
        st.0.monitor.tick().unwrap();

        let Json(body) = handle_history(st).await;
        let v = to_value(&body);
        assert_eq!(v["len"], 2);
        assert_eq!(v["capacity"], 24);
        assert_eq!(v["samples"][0]["lte"]["rsrp"], -100.0);
        assert_eq!(v["samples"][1]["lte"]["rsrp"], -90.0);
    }

    #[tokio::test]
    async fn extrema_shape() {
        let st = state(vec![Ok(snapshot(-90.0)), Ok(snapshot(-100.0))]);
        st.0.monitor.tick().unwrap();
        st.0.monitor.tick().unwrap();

        let Json(body) = handle_extrema(st).await;
        let v = to_value(&body);
        assert_eq!(v["best"]["lte"]["rsrp"], -90.0);
        assert_eq!(v["worst"]["lte"]["rsrp"], -100.0);
        // No 5G readings: seeds come back.
        assert_eq!(v["best"]["nr"]["rsrp"], -140.0);
        assert_eq!(v["worst"]["nr"]["snr"], 40.0);
    }

    #[tokio::test]
    async fn health_tracks_failures() {
        let st = state(vec![]);
        let Json(body) = handle_health(state(vec![])).await;
        assert_eq!(to_value(&body)["status"], "waiting");

        assert!(st.0.monitor.tick().is_err());
        let Json(body) = handle_health(st).await;
        let v = to_value(&body);
        assert_eq!(v["status"], "degraded");
        assert_eq!(v["ticks"], 1);
        assert_eq!(v["failures"], 1);
        assert_eq!(v["source"], "script");
        assert!(v["last_error"].as_str().unwrap().contains("done"));
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let Json(v) = handle_index(state(vec![])).await;
        assert_eq!(v["name"], "gatewatch");
        assert_eq!(v["model"], "KVD21");
        assert!(v["endpoints"]["/api/v1/extrema"].is_string());
    }

    #[test]
    fn router_builds() {
        let monitor = Arc::new(SignalMonitor::new(Box::new(Script(Mutex::new(vec![])))));
        let _router = build_router(monitor, None);
    }
}
