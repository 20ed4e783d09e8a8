use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emergency categories offered by the SOS picker. The wire and database
/// representation is the human-readable label, matching what responders see.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyType {
    #[serde(rename = "Medical Emergency")]
    MedicalEmergency,
    Rescue,
    Fire,
    Flood,
    Earthquake,
    #[serde(rename = "Crime/Assault")]
    CrimeAssault,
}

impl EmergencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyType::MedicalEmergency => "Medical Emergency",
            EmergencyType::Rescue => "Rescue",
            EmergencyType::Fire => "Fire",
            EmergencyType::Flood => "Flood",
            EmergencyType::Earthquake => "Earthquake",
            EmergencyType::CrimeAssault => "Crime/Assault",
        }
    }

    pub fn parse(s: &str) -> Option<EmergencyType> {
        match s {
            "Medical Emergency" => Some(EmergencyType::MedicalEmergency),
            "Rescue" => Some(EmergencyType::Rescue),
            "Fire" => Some(EmergencyType::Fire),
            "Flood" => Some(EmergencyType::Flood),
            "Earthquake" => Some(EmergencyType::Earthquake),
            "Crime/Assault" => Some(EmergencyType::CrimeAssault),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an alert. Transitions exactly once, Active to
/// Resolved, and never back.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "Active",
            AlertStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Option<AlertStatus> {
        match s {
            "Active" => Some(AlertStatus::Active),
            "Resolved" => Some(AlertStatus::Resolved),
            _ => None,
        }
    }
}

/// One distress signal as stored. `id` and `created_at` are assigned by the
/// store at append time and never change afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SosAlert {
    pub id: Uuid,
    pub reporter_name: String,
    pub reporter_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_type: EmergencyType,
    pub details: Option<String>,
    pub status: AlertStatus,
    pub created_at: NaiveDateTime,
}

impl SosAlert {
    /// Whether the record carries enough position data for the responder
    /// map's "Directions" action. Missing coordinates never block creation.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Reporter-supplied portion of an alert, before the store assigns
/// identity, timestamp and status.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SosAlertDraft {
    pub reporter_name: String,
    pub reporter_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_type: EmergencyType,
    pub details: Option<String>,
}

/// Signed-in user's profile fields consumed at alert-creation time.
/// Signup/login/editing of the profile happens elsewhere.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserProfile {
    pub full_name: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_type_labels_round_trip() {
        for ty in [
            EmergencyType::MedicalEmergency,
            EmergencyType::Rescue,
            EmergencyType::Fire,
            EmergencyType::Flood,
            EmergencyType::Earthquake,
            EmergencyType::CrimeAssault,
        ] {
            assert_eq!(EmergencyType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EmergencyType::parse("Volcano"), None);
    }

    #[test]
    fn emergency_type_uses_picker_labels_on_the_wire() {
        let json = serde_json::to_string(&EmergencyType::CrimeAssault).unwrap();
        assert_eq!(json, "\"Crime/Assault\"");
        let back: EmergencyType = serde_json::from_str("\"Medical Emergency\"").unwrap();
        assert_eq!(back, EmergencyType::MedicalEmergency);
    }
}
