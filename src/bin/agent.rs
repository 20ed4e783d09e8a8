use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use immediaid_server::agent::{
    AlertFeed, CountdownHandle, FixedLocationProvider, SubmissionError, SubmissionFlow,
};
use immediaid_server::alert::{EmergencyType, UserProfile};
use immediaid_server::store::{AlertStore, HttpAlertStore, StoreError};
use immediaid_server::agent::CountdownOutcome;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::error;
use uuid::Uuid;

/// Result of the most recent SOS trigger, kept so the caller who got the
/// initial 202 can come back and see whether the send actually went
/// through.
#[derive(Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SendStatus {
    Idle,
    CountingDown,
    Submitted { alert_id: Uuid },
    Cancelled,
    Failed { error: String },
}

struct AppState {
    flow: SubmissionFlow,
    feed: Arc<AlertFeed>,
    countdown: Mutex<Option<CountdownHandle>>,
    last_send: Mutex<SendStatus>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("Starting IMMEDIAID field agent...");

    let api_url =
        std::env::var("SOS_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let store: Arc<dyn AlertStore> = Arc::new(HttpAlertStore::new(&api_url));

    let profile = UserProfile {
        full_name: std::env::var("REPORTER_NAME").unwrap_or_default(),
        address: std::env::var("REPORTER_ADDRESS").unwrap_or_default(),
    };

    // Stationary install: position comes from configuration, not GPS.
    let latitude: f64 = std::env::var("DEVICE_LATITUDE")
        .expect("DEVICE_LATITUDE must be set")
        .parse()
        .expect("DEVICE_LATITUDE must be a number");
    let longitude: f64 = std::env::var("DEVICE_LONGITUDE")
        .expect("DEVICE_LONGITUDE must be set")
        .parse()
        .expect("DEVICE_LONGITUDE must be a number");
    let location = Arc::new(FixedLocationProvider::new(
        latitude,
        longitude,
        std::env::var("DEVICE_LOCATION_LABEL").unwrap_or_default(),
    ));

    let flow = SubmissionFlow::new(store.clone(), location, profile);
    let feed = Arc::new(AlertFeed::new(store));

    // Background poll loop; failures are retried on the next tick.
    let poller = feed.clone();
    tokio::spawn(async move { poller.run().await });

    // Log snapshot changes so an operator watching the agent sees the
    // active set move.
    let mut snapshot_rx = feed.subscribe();
    tokio::spawn(async move {
        while snapshot_rx.changed().await.is_ok() {
            let count = snapshot_rx.borrow_and_update().len();
            tracing::info!("SOS feed updated: {} active alert(s)", count);
        }
    });

    let state = Arc::new(AppState {
        flow,
        feed,
        countdown: Mutex::new(None),
        last_send: Mutex::new(SendStatus::Idle),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/sos", post(trigger_sos))
        .route("/sos/status", get(sos_status))
        .route("/sos/cancel", post(cancel_sos))
        .route("/feed", get(view_feed))
        .route("/feed/:id/resolve", post(resolve_alert))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3002));
    tracing::info!("Agent listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct TriggerRequest {
    emergency_type: Option<EmergencyType>,
    details: Option<String>,
}

// POST /sos - the confirmed SOS gesture; starts the cancellable countdown
async fn trigger_sos(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TriggerRequest>,
) -> impl IntoResponse {
    match state.flow.begin(payload.emergency_type, payload.details) {
        Ok(mut handle) => {
            let remaining = handle.remaining();

            // Publish the terminal result so a failure after the 202 is
            // observable at /sos/status, not just in the process log.
            if let Some(outcome_rx) = handle.take_outcome() {
                let watcher_state = state.clone();
                tokio::spawn(async move {
                    let status = match outcome_rx.await {
                        Ok(CountdownOutcome::Submitted(alert)) => {
                            SendStatus::Submitted { alert_id: alert.id }
                        }
                        Ok(CountdownOutcome::Cancelled) | Err(_) => SendStatus::Cancelled,
                        Ok(CountdownOutcome::Failed(e)) => SendStatus::Failed {
                            error: e.to_string(),
                        },
                    };
                    *watcher_state
                        .last_send
                        .lock()
                        .expect("send status lock poisoned") = status;
                });
            }

            *state.last_send.lock().expect("send status lock poisoned") =
                SendStatus::CountingDown;
            *state.countdown.lock().expect("countdown lock poisoned") = Some(handle);
            (
                axum::http::StatusCode::ACCEPTED,
                Json(serde_json::json!({
                    "status": "counting_down",
                    "remaining": remaining,
                })),
            )
                .into_response()
        }
        Err(e @ SubmissionError::MissingEmergencyType) => {
            (axum::http::StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e @ SubmissionError::AlreadyInProgress) => {
            (axum::http::StatusCode::CONFLICT, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Failed to start SOS countdown: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start SOS countdown",
            )
                .into_response()
        }
    }
}

// GET /sos/status - terminal result of the most recent trigger
async fn sos_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state
        .last_send
        .lock()
        .expect("send status lock poisoned")
        .clone();
    Json(status)
}

// POST /sos/cancel - abort the countdown before it expires
async fn cancel_sos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut guard = state.countdown.lock().expect("countdown lock poisoned");
    match guard.as_mut() {
        Some(handle) if handle.remaining() > 0 => {
            handle.cancel();
            *guard = None;
            // The final tick can race this request; the countdown task has
            // the last word, so /sos/status is the authoritative answer on
            // whether the cancel landed before transmission.
            (
                axum::http::StatusCode::ACCEPTED,
                Json(serde_json::json!({"status": "cancel_requested"})),
            )
                .into_response()
        }
        _ => (
            axum::http::StatusCode::CONFLICT,
            "No SOS countdown in progress",
        )
            .into_response(),
    }
}

// GET /feed - current Active snapshot
async fn view_feed(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.feed.snapshot())
}

// POST /feed/:id/resolve
async fn resolve_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.feed.resolve(alert_id).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"status": "resolved"})),
        )
            .into_response(),
        Err(StoreError::NotFound) => {
            (axum::http::StatusCode::NOT_FOUND, "Alert not found").into_response()
        }
        Err(e) => {
            error!("Failed to resolve alert {}: {}", alert_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resolve alert",
            )
                .into_response()
        }
    }
}
