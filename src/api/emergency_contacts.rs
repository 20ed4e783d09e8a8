use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::entities::{emergency_contact, prelude::*};

#[derive(Deserialize)]
pub struct CreateEmergencyContactRequest {
    pub name: String,
    pub phone: String,
    pub priority: Option<i32>,
}

#[derive(Serialize)]
pub struct EmergencyContactResponse {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub priority: i32,
}

impl From<emergency_contact::Model> for EmergencyContactResponse {
    fn from(model: emergency_contact::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            priority: model.priority,
        }
    }
}

// GET /api/emergency-contacts - hotline directory, highest priority first
pub async fn list_emergency_contacts(
    Extension(db): Extension<DatabaseConnection>,
) -> impl IntoResponse {
    match EmergencyContact::find()
        .order_by_asc(emergency_contact::Column::Priority)
        .all(&db)
        .await
    {
        Ok(contacts) => {
            let response: Vec<EmergencyContactResponse> =
                contacts.into_iter().map(|c| c.into()).collect();
            (axum::http::StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch emergency contacts: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch emergency contacts",
            )
                .into_response()
        }
    }
}

// POST /api/emergency-contacts
pub async fn create_emergency_contact(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateEmergencyContactRequest>,
) -> impl IntoResponse {
    let active_model = emergency_contact::ActiveModel {
        name: Set(payload.name),
        phone: Set(payload.phone),
        priority: Set(payload.priority.unwrap_or(0)),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    match active_model.insert(&db).await {
        Ok(contact) => (
            axum::http::StatusCode::CREATED,
            Json(EmergencyContactResponse::from(contact)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create emergency contact: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create emergency contact",
            )
                .into_response()
        }
    }
}

// DELETE /api/emergency-contacts/:id
pub async fn delete_emergency_contact(
    Extension(db): Extension<DatabaseConnection>,
    Path(contact_id): Path<i32>,
) -> impl IntoResponse {
    match EmergencyContact::delete_by_id(contact_id).exec(&db).await {
        Ok(result) if result.rows_affected > 0 => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"status": "deleted"})),
        )
            .into_response(),
        Ok(_) => (axum::http::StatusCode::NOT_FOUND, "Contact not found").into_response(),
        Err(e) => {
            error!("Failed to delete emergency contact {}: {}", contact_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete emergency contact",
            )
                .into_response()
        }
    }
}
