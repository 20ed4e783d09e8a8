use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use super::{AlertStore, StoreError};
use crate::alert::{SosAlert, SosAlertDraft};

// Store calls are the flow's only suspension points, so they must not hang
// a device in Submitting forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side alert store speaking the server's REST API. This is the
/// Transport used by field devices; all persistence happens on the server.
pub struct HttpAlertStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAlertStore {
    /// `base_url` is the server root, e.g. `http://192.168.0.103:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn transport_err(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl AlertStore for HttpAlertStore {
    async fn append(&self, draft: SosAlertDraft) -> Result<SosAlert, StoreError> {
        let body = serde_json::json!({
            "emergency_type": draft.emergency_type,
            "details": draft.details,
            "name": draft.reporter_name,
            "address": draft.reporter_address,
            "latitude": draft.latitude,
            "longitude": draft.longitude,
        });

        let response = self
            .client
            .post(format!("{}/api/sos", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "POST /api/sos returned {}",
                response.status()
            )));
        }
        response.json::<SosAlert>().await.map_err(transport_err)
    }

    async fn list_active(&self) -> Result<Vec<SosAlert>, StoreError> {
        let response = self
            .client
            .get(format!("{}/api/sos", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "GET /api/sos returned {}",
                response.status()
            )));
        }
        response.json::<Vec<SosAlert>>().await.map_err(transport_err)
    }

    async fn resolve(&self, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(format!("{}/api/sos/{}", self.base_url, id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_err)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            status => Err(StoreError::Unavailable(format!(
                "PATCH /api/sos/{} returned {}",
                id, status
            ))),
        }
    }
}
