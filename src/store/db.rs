use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::error;
use uuid::Uuid;

use super::{AlertStore, StoreError};
use crate::alert::{AlertStatus, EmergencyType, SosAlert, SosAlertDraft};
use crate::entities::sos_alert;

/// Postgres-backed alert store used by the server process. This is the
/// canonical shared store; every device and responder sees the same rows.
#[derive(Clone)]
pub struct DbAlertStore {
    db: DatabaseConnection,
}

impl DbAlertStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(model: sos_alert::Model) -> Result<SosAlert, StoreError> {
    let emergency_type = EmergencyType::parse(&model.emergency_type).ok_or_else(|| {
        StoreError::Unavailable(format!(
            "unrecognized emergency type in row {}: {}",
            model.id, model.emergency_type
        ))
    })?;
    let status = AlertStatus::parse(&model.status).ok_or_else(|| {
        StoreError::Unavailable(format!(
            "unrecognized status in row {}: {}",
            model.id, model.status
        ))
    })?;
    Ok(SosAlert {
        id: model.id,
        reporter_name: model.reporter_name,
        reporter_address: model.reporter_address,
        latitude: model.latitude,
        longitude: model.longitude,
        emergency_type,
        details: model.details,
        status,
        created_at: model.created_at,
    })
}

#[async_trait]
impl AlertStore for DbAlertStore {
    async fn append(&self, draft: SosAlertDraft) -> Result<SosAlert, StoreError> {
        let active_model = sos_alert::ActiveModel {
            id: Set(Uuid::new_v4()),
            reporter_name: Set(draft.reporter_name),
            reporter_address: Set(draft.reporter_address),
            latitude: Set(draft.latitude),
            longitude: Set(draft.longitude),
            emergency_type: Set(draft.emergency_type.as_str().to_string()),
            details: Set(draft.details),
            status: Set(AlertStatus::Active.as_str().to_string()),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            error!("Failed to insert SOS alert: {}", e);
            StoreError::Unavailable(e.to_string())
        })?;
        to_domain(model)
    }

    async fn list_active(&self) -> Result<Vec<SosAlert>, StoreError> {
        let models = sos_alert::Entity::find()
            .filter(sos_alert::Column::Status.eq(AlertStatus::Active.as_str()))
            .order_by_asc(sos_alert::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to fetch active SOS alerts: {}", e);
                StoreError::Unavailable(e.to_string())
            })?;

        models.into_iter().map(to_domain).collect()
    }

    async fn resolve(&self, id: Uuid) -> Result<(), StoreError> {
        let model = sos_alert::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to fetch SOS alert {}: {}", id, e);
                StoreError::Unavailable(e.to_string())
            })?
            .ok_or(StoreError::NotFound)?;

        // Already Resolved: idempotent no-op, concurrent resolves both land
        // on the same terminal state.
        if model.status == AlertStatus::Resolved.as_str() {
            return Ok(());
        }

        let mut active_model: sos_alert::ActiveModel = model.into();
        active_model.status = Set(AlertStatus::Resolved.as_str().to_string());
        active_model.update(&self.db).await.map_err(|e| {
            error!("Failed to resolve SOS alert {}: {}", id, e);
            StoreError::Unavailable(e.to_string())
        })?;
        Ok(())
    }
}
