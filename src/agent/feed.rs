use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::alert::SosAlert;
use crate::store::{AlertStore, StoreError};

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Responder-facing view of the Active alert set.
///
/// Polls the store on a fixed interval; each successful poll replaces the
/// snapshot wholesale. A failed poll keeps the previous snapshot and is
/// retried on the next tick without surfacing anything. Consumers watch
/// the snapshot through a channel instead of re-polling the store
/// themselves.
pub struct AlertFeed {
    store: Arc<dyn AlertStore>,
    interval: Duration,
    snapshot: watch::Sender<Vec<SosAlert>>,
}

impl AlertFeed {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self::with_interval(store, POLL_INTERVAL)
    }

    pub fn with_interval(store: Arc<dyn AlertStore>, interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            store,
            interval,
            snapshot,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SosAlert>> {
        self.snapshot.subscribe()
    }

    /// Current view without waiting for the next tick.
    pub fn snapshot(&self) -> Vec<SosAlert> {
        self.snapshot.borrow().clone()
    }

    /// One poll. Replaces the snapshot on success; on failure the previous
    /// snapshot stands.
    pub async fn poll_once(&self) -> Result<usize, StoreError> {
        let alerts = self.store.list_active().await?;
        let count = alerts.len();
        self.snapshot.send_replace(alerts);
        Ok(count)
    }

    /// Poll loop; never returns. Poll failures are logged and retried on
    /// the next tick.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!("SOS feed poll failed, keeping previous view: {}", e);
            }
        }
    }

    /// Marks an alert handled. On success the alert is removed from the
    /// local snapshot immediately rather than waiting for the next poll;
    /// the following poll reconciles either way.
    pub async fn resolve(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.resolve(id).await?;
        self.snapshot.send_modify(|alerts| alerts.retain(|a| a.id != id));
        info!(alert_id = %id, "SOS alert resolved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertStatus, EmergencyType, SosAlertDraft};
    use crate::store::MemoryAlertStore;

    fn draft(emergency_type: EmergencyType) -> SosAlertDraft {
        SosAlertDraft {
            reporter_name: "Maria Santos".to_string(),
            reporter_address: "Dagatan, Lipa, Batangas".to_string(),
            latitude: Some(13.9606),
            longitude: Some(121.1633),
            emergency_type,
            details: None,
        }
    }

    fn feed_over(store: &Arc<MemoryAlertStore>) -> AlertFeed {
        AlertFeed::with_interval(store.clone() as Arc<dyn AlertStore>, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn poll_replaces_the_snapshot_wholesale() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);

        let first = store.append(draft(EmergencyType::Fire)).await.unwrap();
        assert_eq!(feed.poll_once().await.unwrap(), 1);
        assert_eq!(feed.snapshot()[0].id, first.id);

        store.resolve(first.id).await.unwrap();
        let second = store.append(draft(EmergencyType::Flood)).await.unwrap();
        assert_eq!(feed.poll_once().await.unwrap(), 1);

        let view = feed.snapshot();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, second.id);
    }

    #[tokio::test]
    async fn failed_poll_keeps_the_previous_view() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);

        let alert = store.append(draft(EmergencyType::Rescue)).await.unwrap();
        feed.poll_once().await.unwrap();

        store.set_unavailable(true);
        assert!(feed.poll_once().await.is_err());
        assert_eq!(feed.snapshot()[0].id, alert.id);

        store.set_unavailable(false);
        feed.poll_once().await.unwrap();
        assert_eq!(feed.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn resolve_removes_optimistically_before_the_next_poll() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);

        let alert = store.append(draft(EmergencyType::Fire)).await.unwrap();
        let kept = store.append(draft(EmergencyType::Flood)).await.unwrap();
        feed.poll_once().await.unwrap();

        feed.resolve(alert.id).await.unwrap();
        let view = feed.snapshot();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, kept.id);

        // The next poll agrees with the optimistic removal.
        feed.poll_once().await.unwrap();
        assert_eq!(feed.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_resolves_of_one_alert_both_succeed() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);

        let alert = store.append(draft(EmergencyType::CrimeAssault)).await.unwrap();
        feed.poll_once().await.unwrap();

        let (a, b) = tokio::join!(feed.resolve(alert.id), feed.resolve(alert.id));
        assert!(a.is_ok());
        assert!(b.is_ok());

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AlertStatus::Resolved);
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_of_unknown_id_surfaces_not_found_and_keeps_the_view() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);

        let alert = store.append(draft(EmergencyType::Fire)).await.unwrap();
        feed.poll_once().await.unwrap();

        let err = feed.resolve(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(feed.snapshot()[0].id, alert.id);
    }

    #[tokio::test]
    async fn subscribers_see_each_replacement() {
        let store = Arc::new(MemoryAlertStore::new());
        let feed = feed_over(&store);
        let mut rx = feed.subscribe();

        store.append(draft(EmergencyType::Fire)).await.unwrap();
        feed.poll_once().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
