use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tracing::{error, info};

use super::location::{LocationError, LocationProvider, ResolvedLocation};
use crate::alert::{EmergencyType, SosAlert, SosAlertDraft, UserProfile};
use crate::store::{AlertStore, StoreError};

/// Ticks between user confirmation and transmission, the window for
/// aborting an accidental trigger.
const COUNTDOWN_TICKS: u32 = 5;
const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Validation failure; recovered locally and never reaches the
    /// transport.
    #[error("no emergency type selected")]
    MissingEmergencyType,
    /// A second SOS press while a countdown is live. The first countdown
    /// keeps running untouched.
    #[error("an SOS countdown is already in progress")]
    AlreadyInProgress,
    #[error("location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),
    #[error("failed to deliver SOS alert: {0}")]
    Transport(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CountingDown,
    Submitting,
}

const STATE_IDLE: u8 = 0;
const STATE_COUNTING_DOWN: u8 = 1;
const STATE_SUBMITTING: u8 = 2;

/// Terminal result of one confirmed countdown.
#[derive(Debug)]
pub enum CountdownOutcome {
    Submitted(SosAlert),
    Cancelled,
    Failed(SubmissionError),
}

/// Live countdown returned by [`SubmissionFlow::begin`]. Dropping the
/// handle does not abort the countdown; only an explicit [`cancel`]
/// (before expiry) does.
///
/// [`cancel`]: CountdownHandle::cancel
#[derive(Debug)]
pub struct CountdownHandle {
    cancel: Option<oneshot::Sender<()>>,
    outcome: Option<oneshot::Receiver<CountdownOutcome>>,
    remaining: watch::Receiver<u32>,
}

impl CountdownHandle {
    /// Aborts the countdown. A no-op once submission has started.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Ticks left before transmission.
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn subscribe_remaining(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    /// Detaches the outcome receiver so a separate task can report the
    /// result while the handle stays behind for cancellation. `None` once
    /// the receiver is gone.
    pub fn take_outcome(&mut self) -> Option<oneshot::Receiver<CountdownOutcome>> {
        self.outcome.take()
    }

    /// Waits for the countdown to finish. Resolves exactly once; calling
    /// again afterwards reports `Cancelled`.
    pub async fn outcome(&mut self) -> CountdownOutcome {
        match self.outcome.take() {
            Some(rx) => rx.await.unwrap_or(CountdownOutcome::Cancelled),
            None => CountdownOutcome::Cancelled,
        }
    }
}

/// Turns a confirmed SOS gesture into at most one durable alert.
///
/// One flow instance exists per device. The state machine is Idle ->
/// CountingDown -> Submitting -> Idle; a begin() while not Idle is
/// rejected, so countdowns never interleave and each confirmed countdown
/// produces at most one appended record.
pub struct SubmissionFlow {
    store: Arc<dyn AlertStore>,
    location: Arc<dyn LocationProvider>,
    profile: UserProfile,
    ticks: u32,
    tick: Duration,
    state: Arc<AtomicU8>,
}

impl SubmissionFlow {
    pub fn new(
        store: Arc<dyn AlertStore>,
        location: Arc<dyn LocationProvider>,
        profile: UserProfile,
    ) -> Self {
        Self {
            store,
            location,
            profile,
            ticks: COUNTDOWN_TICKS,
            tick: COUNTDOWN_TICK,
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
        }
    }

    /// Overrides the countdown length, mainly for tests and demos.
    pub fn with_countdown(mut self, ticks: u32, tick: Duration) -> Self {
        self.ticks = ticks;
        self.tick = tick;
        self
    }

    pub fn state(&self) -> FlowState {
        match self.state.load(Ordering::SeqCst) {
            STATE_COUNTING_DOWN => FlowState::CountingDown,
            STATE_SUBMITTING => FlowState::Submitting,
            _ => FlowState::Idle,
        }
    }

    /// Validates the selection and starts the cancellable pre-send
    /// countdown. On expiry the device location is resolved and the alert
    /// appended to the store, exactly once. Any failure leaves the store
    /// untouched and returns the flow to Idle; nothing is retried
    /// automatically.
    pub fn begin(
        &self,
        emergency_type: Option<EmergencyType>,
        details: Option<String>,
    ) -> Result<CountdownHandle, SubmissionError> {
        let emergency_type = emergency_type.ok_or(SubmissionError::MissingEmergencyType)?;

        self.state
            .compare_exchange(
                STATE_IDLE,
                STATE_COUNTING_DOWN,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| SubmissionError::AlreadyInProgress)?;

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let (remaining_tx, remaining_rx) = watch::channel(self.ticks);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let store = self.store.clone();
        let location = self.location.clone();
        let profile = self.profile.clone();
        let state = self.state.clone();
        let ticks = self.ticks;
        let tick = self.tick;

        tokio::spawn(async move {
            let mut remaining = ticks;
            while remaining > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(tick) => {
                        remaining -= 1;
                        let _ = remaining_tx.send(remaining);
                    }
                    _ = &mut cancel_rx => {
                        state.store(STATE_IDLE, Ordering::SeqCst);
                        info!("SOS countdown cancelled, nothing transmitted");
                        let _ = outcome_tx.send(CountdownOutcome::Cancelled);
                        return;
                    }
                }
            }

            state.store(STATE_SUBMITTING, Ordering::SeqCst);
            let result = async {
                let location = location.current().await?;
                submit_alert(store.as_ref(), emergency_type, details, &profile, location).await
            }
            .await;
            state.store(STATE_IDLE, Ordering::SeqCst);

            let outcome = match result {
                Ok(alert) => {
                    info!(
                        alert_id = %alert.id,
                        emergency_type = %alert.emergency_type,
                        "SOS alert submitted"
                    );
                    CountdownOutcome::Submitted(alert)
                }
                Err(e) => {
                    error!("SOS submission failed: {}", e);
                    CountdownOutcome::Failed(e)
                }
            };
            let _ = outcome_tx.send(outcome);
        });

        Ok(CountdownHandle {
            cancel: Some(cancel_tx),
            outcome: Some(outcome_rx),
            remaining: remaining_rx,
        })
    }
}

/// Builds the draft from the reporter's profile and resolved location and
/// appends it. Side effect on success: exactly one new Active record in
/// the store; on failure: none.
pub async fn submit_alert(
    store: &dyn AlertStore,
    emergency_type: EmergencyType,
    details: Option<String>,
    profile: &UserProfile,
    location: ResolvedLocation,
) -> Result<SosAlert, SubmissionError> {
    let reporter_name = if profile.full_name.trim().is_empty() {
        "Unknown User".to_string()
    } else {
        profile.full_name.clone()
    };
    let reporter_address = if location.address.trim().is_empty() {
        "Unknown".to_string()
    } else {
        location.address.clone()
    };

    let draft = SosAlertDraft {
        reporter_name,
        reporter_address,
        latitude: Some(location.latitude),
        longitude: Some(location.longitude),
        emergency_type,
        details: details.filter(|d| !d.trim().is_empty()),
    };

    let alert = store.append(draft).await?;
    Ok(alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::location::FixedLocationProvider;
    use crate::alert::AlertStatus;
    use crate::store::MemoryAlertStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct DeniedLocationProvider;

    #[async_trait]
    impl LocationProvider for DeniedLocationProvider {
        async fn current(&self) -> Result<ResolvedLocation, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            full_name: "Juan Dela Cruz".to_string(),
            address: "Dagatan, Lipa, Batangas".to_string(),
        }
    }

    fn flow_with(
        store: Arc<MemoryAlertStore>,
        location: Arc<dyn LocationProvider>,
    ) -> SubmissionFlow {
        SubmissionFlow::new(store, location, profile())
    }

    fn dagatan() -> Arc<FixedLocationProvider> {
        Arc::new(FixedLocationProvider::new(
            13.9606,
            121.1633,
            "Dagatan, Lipa, Batangas",
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_countdown_submits_exactly_one_active_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan());

        let mut handle = flow
            .begin(
                Some(EmergencyType::Fire),
                Some("smoke on 2nd floor".to_string()),
            )
            .unwrap();
        assert_eq!(handle.remaining(), 5);

        let outcome = handle.outcome().await;
        let alert = match outcome {
            CountdownOutcome::Submitted(alert) => alert,
            other => panic!("expected submission, got {:?}", other),
        };

        let active = store.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, alert.id);
        assert_eq!(active[0].emergency_type, EmergencyType::Fire);
        assert_eq!(active[0].details.as_deref(), Some("smoke on 2nd floor"));
        assert_eq!(active[0].latitude, Some(13.9606));
        assert_eq!(active[0].longitude, Some(121.1633));
        assert_eq!(active[0].reporter_name, "Juan Dela Cruz");
        assert_eq!(active[0].status, AlertStatus::Active);
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_emergency_type_is_a_validation_error() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan());

        let err = flow.begin(None, None).unwrap_err();
        assert!(matches!(err, SubmissionError::MissingEmergencyType));
        assert_eq!(flow.state(), FlowState::Idle);
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_expiry_has_no_side_effects() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan());

        let mut handle = flow.begin(Some(EmergencyType::Flood), None).unwrap();
        handle.cancel();

        assert!(matches!(handle.outcome().await, CountdownOutcome::Cancelled));
        assert!(store.all().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_press_during_countdown_is_rejected() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan());

        let mut first = flow.begin(Some(EmergencyType::Rescue), None).unwrap();
        let err = flow.begin(Some(EmergencyType::Fire), None).unwrap_err();
        assert!(matches!(err, SubmissionError::AlreadyInProgress));

        // The first countdown is untouched and still submits exactly once.
        assert!(matches!(
            first.outcome().await,
            CountdownOutcome::Submitted(_)
        ));
        assert_eq!(store.all().len(), 1);

        // Back to Idle, a new send is legitimate (multiple real
        // emergencies happen).
        let mut second = flow.begin(Some(EmergencyType::Fire), None).unwrap();
        assert!(matches!(
            second.outcome().await,
            CountdownOutcome::Submitted(_)
        ));
        assert_eq!(store.all().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_location_aborts_without_a_record() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), Arc::new(DeniedLocationProvider));

        let mut handle = flow.begin(Some(EmergencyType::Earthquake), None).unwrap();
        match handle.outcome().await {
            CountdownOutcome::Failed(SubmissionError::LocationUnavailable(_)) => {}
            other => panic!("expected location failure, got {:?}", other),
        }
        assert!(store.all().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_leaves_no_partial_record() {
        let store = Arc::new(MemoryAlertStore::new());
        store.set_unavailable(true);
        let flow = flow_with(store.clone(), dagatan());

        let mut handle = flow.begin(Some(EmergencyType::Fire), None).unwrap();
        match handle.outcome().await {
            CountdownOutcome::Failed(SubmissionError::Transport(StoreError::Unavailable(_))) => {}
            other => panic!("expected transport failure, got {:?}", other),
        }

        store.set_unavailable(false);
        assert!(store.all().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn detached_outcome_reports_failure_while_cancel_stays_usable() {
        let store = Arc::new(MemoryAlertStore::new());
        store.set_unavailable(true);
        let flow = flow_with(store.clone(), dagatan());

        // The handle keeps its cancel half; the outcome half moves to a
        // watcher task the way the agent binary publishes send status.
        let mut handle = flow.begin(Some(EmergencyType::Fire), None).unwrap();
        let outcome_rx = handle.take_outcome().unwrap();
        let reported = Arc::new(Mutex::new(None));
        let sink = reported.clone();
        let watcher = tokio::spawn(async move {
            let status = match outcome_rx.await {
                Ok(CountdownOutcome::Failed(e)) => format!("failed: {}", e),
                other => format!("unexpected: {:?}", other),
            };
            *sink.lock().unwrap() = Some(status);
        });

        watcher.await.unwrap();
        let status = reported.lock().unwrap().clone().unwrap();
        assert!(status.starts_with("failed: failed to deliver SOS alert"));

        // Taken means taken; late cancel is a harmless no-op.
        assert!(handle.take_outcome().is_none());
        handle.cancel();
        assert!(matches!(handle.outcome().await, CountdownOutcome::Cancelled));
    }

    #[tokio::test]
    async fn shortened_countdown_still_submits_exactly_once() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan())
            .with_countdown(2, Duration::from_millis(1));

        let mut handle = flow.begin(Some(EmergencyType::Flood), None).unwrap();
        assert_eq!(handle.remaining(), 2);
        assert!(matches!(
            handle.outcome().await,
            CountdownOutcome::Submitted(_)
        ));
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_down_to_zero() {
        let store = Arc::new(MemoryAlertStore::new());
        let flow = flow_with(store.clone(), dagatan());

        let mut handle = flow.begin(Some(EmergencyType::Fire), None).unwrap();
        let remaining = handle.subscribe_remaining();
        handle.outcome().await;
        assert_eq!(*remaining.borrow(), 0);
    }

    #[tokio::test]
    async fn blank_profile_and_address_fall_back_to_unknown() {
        let store = MemoryAlertStore::new();
        let anonymous = UserProfile {
            full_name: "  ".to_string(),
            address: String::new(),
        };
        let alert = submit_alert(
            &store,
            EmergencyType::Rescue,
            Some("   ".to_string()),
            &anonymous,
            ResolvedLocation {
                latitude: 13.9606,
                longitude: 121.1633,
                address: String::new(),
            },
        )
        .await
        .unwrap();

        assert_eq!(alert.reporter_name, "Unknown User");
        assert_eq!(alert.reporter_address, "Unknown");
        assert_eq!(alert.details, None);
    }
}
