use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::alert::{EmergencyType, SosAlertDraft};
use crate::metrics;
use crate::store::{AlertStore, StoreError};

#[derive(Deserialize)]
pub struct CreateSosRequest {
    pub emergency_type: EmergencyType,
    pub details: Option<String>,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// POST /api/sos
pub async fn create_sos_alert(
    Extension(store): Extension<Arc<dyn AlertStore>>,
    Json(payload): Json<CreateSosRequest>,
) -> impl IntoResponse {
    let draft = SosAlertDraft {
        reporter_name: if payload.name.trim().is_empty() {
            "Unknown User".to_string()
        } else {
            payload.name
        },
        reporter_address: if payload.address.trim().is_empty() {
            "Unknown".to_string()
        } else {
            payload.address
        },
        latitude: payload.latitude,
        longitude: payload.longitude,
        emergency_type: payload.emergency_type,
        details: payload.details.filter(|d| !d.trim().is_empty()),
    };

    match store.append(draft).await {
        Ok(alert) => {
            info!(
                alert_id = %alert.id,
                emergency_type = %alert.emergency_type,
                "SOS alert recorded"
            );
            metrics::increment_sos_alerts(alert.emergency_type.as_str());
            (axum::http::StatusCode::CREATED, Json(alert)).into_response()
        }
        Err(e) => {
            error!("Failed to record SOS alert: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record SOS alert",
            )
                .into_response()
        }
    }
}

// GET /api/sos - Active alerts only, oldest first
pub async fn list_sos_alerts(
    Extension(store): Extension<Arc<dyn AlertStore>>,
) -> impl IntoResponse {
    match store.list_active().await {
        Ok(alerts) => (axum::http::StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => {
            error!("Failed to fetch SOS alerts: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch SOS alerts",
            )
                .into_response()
        }
    }
}

// PATCH /api/sos/:id - mark resolved; repeat calls succeed as no-ops
pub async fn resolve_sos_alert(
    Extension(store): Extension<Arc<dyn AlertStore>>,
    Path(alert_id): Path<Uuid>,
) -> impl IntoResponse {
    match store.resolve(alert_id).await {
        Ok(()) => {
            metrics::increment_sos_resolved();
            if let Ok(active) = store.list_active().await {
                metrics::set_active_alerts(active.len());
            }
            (
                axum::http::StatusCode::OK,
                Json(serde_json::json!({"status": "resolved"})),
            )
                .into_response()
        }
        Err(StoreError::NotFound) => {
            (axum::http::StatusCode::NOT_FOUND, "Alert not found").into_response()
        }
        Err(e) => {
            error!("Failed to resolve SOS alert {}: {}", alert_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resolve SOS alert",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertStatus, SosAlert};
    use crate::store::MemoryAlertStore;
    use axum::routing::get;
    use axum::Router;
    use axum_test::TestServer;

    fn test_server() -> (TestServer, Arc<MemoryAlertStore>) {
        let store = Arc::new(MemoryAlertStore::new());
        let app = Router::new()
            .route("/api/sos", get(list_sos_alerts).post(create_sos_alert))
            .route("/api/sos/:id", axum::routing::patch(resolve_sos_alert))
            .layer(Extension(store.clone() as Arc<dyn AlertStore>));
        (TestServer::new(app).unwrap(), store)
    }

    fn fire_payload() -> serde_json::Value {
        serde_json::json!({
            "emergency_type": "Fire",
            "details": "smoke on 2nd floor",
            "name": "Juan Dela Cruz",
            "address": "Dagatan, Lipa, Batangas",
            "latitude": 13.9606,
            "longitude": 121.1633,
        })
    }

    #[tokio::test]
    async fn post_creates_an_active_alert_and_get_returns_it() {
        let (server, _store) = test_server();

        let created = server.post("/api/sos").json(&fire_payload()).await;
        created.assert_status(axum::http::StatusCode::CREATED);
        let alert: SosAlert = created.json();
        assert_eq!(alert.emergency_type, EmergencyType::Fire);
        assert_eq!(alert.status, AlertStatus::Active);

        let listed = server.get("/api/sos").await;
        listed.assert_status_ok();
        let alerts: Vec<SosAlert> = listed.json();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, alert.id);
        assert_eq!(alerts[0].details.as_deref(), Some("smoke on 2nd floor"));
    }

    #[tokio::test]
    async fn unknown_emergency_type_is_rejected_before_the_store() {
        let (server, store) = test_server();

        let response = server
            .post("/api/sos")
            .json(&serde_json::json!({
                "emergency_type": "Volcano",
                "name": "Juan Dela Cruz",
                "address": "Dagatan",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn patch_resolves_idempotently_and_hides_the_alert() {
        let (server, _store) = test_server();

        let alert: SosAlert = server.post("/api/sos").json(&fire_payload()).await.json();

        let first = server.patch(&format!("/api/sos/{}", alert.id)).await;
        first.assert_status_ok();
        let second = server.patch(&format!("/api/sos/{}", alert.id)).await;
        second.assert_status_ok();

        let alerts: Vec<SosAlert> = server.get("/api/sos").await.json();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn resolving_an_unknown_id_is_not_found() {
        let (server, _store) = test_server();
        let response = server.patch(&format!("/api/sos/{}", Uuid::new_v4())).await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_reporter_fields_fall_back_to_unknown() {
        let (server, _store) = test_server();

        let created = server
            .post("/api/sos")
            .json(&serde_json::json!({
                "emergency_type": "Rescue",
                "name": "",
                "address": "  ",
            }))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);
        let alert: SosAlert = created.json();
        assert_eq!(alert.reporter_name, "Unknown User");
        assert_eq!(alert.reporter_address, "Unknown");
        assert_eq!(alert.latitude, None);
        assert!(!alert.has_coordinates());
    }
}
