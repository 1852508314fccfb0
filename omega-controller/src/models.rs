use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use tracing::warn;

use crate::error::ProcessError;
use crate::lifecycle::OperationalState;
use crate::metrics::ControllerMetrics;

pub const UNKNOWN_OPERATION_ID: &str = "UNKNOWN";
pub const PROCESSED_STATUS: &str = "PROCESSED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Exact, case-sensitive match on the wire value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "CRITICAL" => Some(Priority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ThreatLevel {
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl ThreatLevel {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Threats from `MEDIUM` up count as neutralized once processed.
    pub fn is_significant(self) -> bool {
        self >= ThreatLevel::Medium
    }
}

impl From<Option<Priority>> for ThreatLevel {
    fn from(priority: Option<Priority>) -> Self {
        match priority {
            Some(Priority::Critical) => ThreatLevel::Critical,
            Some(Priority::High) => ThreatLevel::High,
            Some(Priority::Medium) => ThreatLevel::Medium,
            Some(Priority::Low) => ThreatLevel::Low,
            None => ThreatLevel::None,
        }
    }
}

/// Incoming operation. Field presence is what gets validated, so every field is
/// optional at this level and `payload: null` still counts as present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub op_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Operation {
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn id_or_unknown(&self) -> &str {
        self.id.as_deref().unwrap_or(UNKNOWN_OPERATION_ID)
    }

    pub fn parsed_priority(&self) -> Option<Priority> {
        self.priority.as_deref().and_then(Priority::parse)
    }
}

/// Outcome of `process_operation`. Serialized untagged so the JSON carries exactly
/// one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Processed {
        success: bool,
        operation_id: String,
        threat_level: u8,
        status: String,
        timestamp: String,
    },
    Rejected {
        success: bool,
        error: String,
    },
}

impl Response {
    pub fn processed(operation_id: impl Into<String>, threat: ThreatLevel, timestamp: String) -> Self {
        Response::Processed {
            success: true,
            operation_id: operation_id.into(),
            threat_level: threat.value(),
            status: PROCESSED_STATUS.to_string(),
            timestamp,
        }
    }

    pub fn rejected(err: &ProcessError) -> Self {
        Response::Rejected {
            success: false,
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Processed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Response::Rejected { error, .. } => Some(error),
            Response::Processed { .. } => None,
        }
    }

    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Response::Processed { operation_id, .. } => Some(operation_id),
            Response::Rejected { .. } => None,
        }
    }

    pub fn threat_level(&self) -> Option<u8> {
        match self {
            Response::Processed { threat_level, .. } => Some(*threat_level),
            Response::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub version: String,
    pub state: OperationalState,
    pub classification: String,
    pub metrics: ControllerMetrics,
    pub timestamp: String,
}

pub(crate) fn now_rfc3339() -> Result<String, time::error::Format> {
    OffsetDateTime::now_utc().format(&Rfc3339)
}

/// Current RFC 3339 UTC time for status reports. Falls back to unix seconds,
/// with a warning, when formatting fails.
pub fn timestamp_now() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|e| {
        warn!(error = %e, "timestamp formatting failed, reporting unix seconds");
        now.unix_timestamp().to_string()
    })
}
