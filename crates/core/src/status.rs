//! Request status constants and enum.
//!
//! The wire strings must match the values stored in the legacy collection
//! blob, including the embedded space in `"In Process"`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Awaiting acceptance.
pub const STATUS_PENDING: &str = "Pending";

/// Accepted by at least one user, work underway.
pub const STATUS_IN_PROCESS: &str = "In Process";

/// All required parties signalled completion.
pub const STATUS_COMPLETED: &str = "Completed";

/// Rejected by the accepting party.
pub const STATUS_REJECTED: &str = "Rejected";

/// All valid status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROCESS,
    STATUS_COMPLETED,
    STATUS_REJECTED,
];

/// Lifecycle status of a request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    #[serde(rename = "In Process")]
    InProcess,
    Completed,
    Rejected,
}

impl RequestStatus {
    /// Return the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::InProcess => STATUS_IN_PROCESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Rejected => STATUS_REJECTED,
        }
    }

    /// Parse from a wire string, returning an error for unknown statuses.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_IN_PROCESS => Ok(Self::InProcess),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_REJECTED => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Whether the status is terminal (eligible for history and expiration).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_as_str() {
        assert_eq!(RequestStatus::Pending.as_str(), "Pending");
        assert_eq!(RequestStatus::InProcess.as_str(), "In Process");
        assert_eq!(RequestStatus::Completed.as_str(), "Completed");
        assert_eq!(RequestStatus::Rejected.as_str(), "Rejected");
    }

    #[test]
    fn status_from_str_valid() {
        assert_eq!(
            RequestStatus::from_str("In Process").unwrap(),
            RequestStatus::InProcess
        );
        assert_eq!(
            RequestStatus::from_str("Pending").unwrap(),
            RequestStatus::Pending
        );
    }

    #[test]
    fn status_from_str_invalid() {
        assert!(RequestStatus::from_str("InProcess").is_err());
        assert!(RequestStatus::from_str("").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::InProcess.is_terminal());
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&RequestStatus::InProcess).unwrap();
        assert_eq!(json, "\"In Process\"");
        let back: RequestStatus = serde_json::from_str("\"In Process\"").unwrap();
        assert_eq!(back, RequestStatus::InProcess);
    }
}
