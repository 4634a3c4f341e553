use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a monitoring session flagged.
///
/// Live sessions only ever raise the first four variants. `Unrecognized`
/// exists so event logs read back from the report store still parse when
/// they carry kinds this build does not know; such events deduct nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    MultipleFacesDetected,
    UserAbsent,
    UserLookingAway,
    SuspiciousObjectDetected {
        #[serde(rename = "objectClass")]
        object_class: String,
    },
    #[serde(other)]
    Unrecognized,
}

impl EventKind {
    pub fn suspicious_object(object_class: impl Into<String>) -> Self {
        EventKind::SuspiciousObjectDetected {
            object_class: object_class.into(),
        }
    }

    /// Human-readable label used in logs and CLI output.
    pub fn label(&self) -> String {
        match self {
            EventKind::MultipleFacesDetected => "Multiple faces detected".to_string(),
            EventKind::UserAbsent => "User absent".to_string(),
            EventKind::UserLookingAway => "User looking away".to_string(),
            EventKind::SuspiciousObjectDetected { object_class } => {
                let mut chars = object_class.chars();
                match chars.next() {
                    Some(first) => {
                        format!("{}{} detected", first.to_uppercase(), chars.as_str())
                    }
                    None => "Object detected".to_string(),
                }
            }
            EventKind::Unrecognized => "Unrecognized event".to_string(),
        }
    }
}

/// An immutable record of one flagged behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }
}
