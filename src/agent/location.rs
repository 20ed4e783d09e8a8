use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location provider failed: {0}")]
    Provider(String),
}

/// Current position plus its reverse-geocoded, human-readable address.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// Supplies the device's current coordinates on demand. May be denied or
/// fail outright; the submission flow aborts without persisting anything
/// in that case.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current(&self) -> Result<ResolvedLocation, LocationError>;
}

/// Fixed coordinates from configuration, for stationary installs (a
/// barangay-hall panic button has no GPS worth polling).
pub struct FixedLocationProvider {
    location: ResolvedLocation,
}

impl FixedLocationProvider {
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        let address = address.into();
        let address = if address.trim().is_empty() {
            "Unknown location".to_string()
        } else {
            address
        };
        Self {
            location: ResolvedLocation {
                latitude,
                longitude,
                address,
            },
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current(&self) -> Result<ResolvedLocation, LocationError> {
        Ok(self.location.clone())
    }
}
