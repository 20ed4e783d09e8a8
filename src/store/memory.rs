use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AlertStore, StoreError};
use crate::alert::{AlertStatus, SosAlert, SosAlertDraft};

/// In-process alert store. This is the local-storage variant of the
/// original app demoted to a test double: it backs unit tests and offline
/// demos, never a production deployment, since per-device storage means
/// responders would not see each other's alerts.
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: Mutex<Vec<SosAlert>>,
    unavailable: AtomicBool,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a storage outage: every operation fails with
    /// [`StoreError::Unavailable`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Full contents regardless of status, for assertions.
    pub fn all(&self) -> Vec<SosAlert> {
        self.alerts.lock().expect("alert store lock poisoned").clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn append(&self, draft: SosAlertDraft) -> Result<SosAlert, StoreError> {
        self.check_available()?;
        let alert = SosAlert {
            id: Uuid::new_v4(),
            reporter_name: draft.reporter_name,
            reporter_address: draft.reporter_address,
            latitude: draft.latitude,
            longitude: draft.longitude,
            emergency_type: draft.emergency_type,
            details: draft.details,
            status: AlertStatus::Active,
            created_at: chrono::Utc::now().naive_utc(),
        };
        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        alerts.push(alert.clone());
        Ok(alert)
    }

    async fn list_active(&self) -> Result<Vec<SosAlert>, StoreError> {
        self.check_available()?;
        let alerts = self.alerts.lock().expect("alert store lock poisoned");
        Ok(alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Active)
            .cloned()
            .collect())
    }

    async fn resolve(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        // Already Resolved is a no-op, not an error.
        alert.status = AlertStatus::Resolved;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::EmergencyType;

    fn draft(emergency_type: EmergencyType) -> SosAlertDraft {
        SosAlertDraft {
            reporter_name: "Juan Dela Cruz".to_string(),
            reporter_address: "Dagatan, Lipa, Batangas".to_string(),
            latitude: Some(13.9606),
            longitude: Some(121.1633),
            emergency_type,
            details: None,
        }
    }

    #[tokio::test]
    async fn append_assigns_pairwise_distinct_ids() {
        let store = MemoryAlertStore::new();
        let mut ids = Vec::new();
        for _ in 0..50 {
            ids.push(store.append(draft(EmergencyType::Flood)).await.unwrap().id);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn append_creates_active_and_list_returns_insertion_order() {
        let store = MemoryAlertStore::new();
        let first = store.append(draft(EmergencyType::Fire)).await.unwrap();
        let second = store.append(draft(EmergencyType::Rescue)).await.unwrap();
        assert_eq!(first.status, AlertStatus::Active);

        let active = store.list_active().await.unwrap();
        assert_eq!(
            active.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        // Stable absent mutation.
        assert_eq!(store.list_active().await.unwrap(), active);
    }

    #[tokio::test]
    async fn resolved_alerts_never_appear_in_the_active_list() {
        let store = MemoryAlertStore::new();
        let alert = store.append(draft(EmergencyType::Earthquake)).await.unwrap();
        store.resolve(alert.id).await.unwrap();
        assert!(store.list_active().await.unwrap().is_empty());
        assert_eq!(store.all()[0].status, AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let store = MemoryAlertStore::new();
        let alert = store.append(draft(EmergencyType::Fire)).await.unwrap();
        store.resolve(alert.id).await.unwrap();
        let after_first = store.all();
        store.resolve(alert.id).await.unwrap();
        assert_eq!(store.all(), after_first);
    }

    #[tokio::test]
    async fn resolve_unknown_id_is_not_found() {
        let store = MemoryAlertStore::new();
        let err = store.resolve(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn failed_append_leaves_no_partial_record() {
        let store = MemoryAlertStore::new();
        store.set_unavailable(true);
        let err = store.append(draft(EmergencyType::Fire)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        store.set_unavailable(false);
        assert!(store.list_active().await.unwrap().is_empty());
        assert!(store.all().is_empty());
    }
}
