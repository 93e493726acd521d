//! JSON bodies exchanged with the control server

use serde::{Deserialize, Serialize};

use crate::fault::{FaultEntry, FaultError, FaultKind, FaultState};

/// Textual result of a control command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<FaultError> for ErrorResponse {
    fn from(err: FaultError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

/// One call-site evaluation sent by a worker process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub name: String,

    #[serde(default)]
    pub ddl: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub table: String,
}

/// The entry as it stood when it fired, enough to run the action remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredFault {
    pub name: String,
    pub kind: String,
    pub extra_arg: i32,
    pub times_triggered: u32,
}

impl From<&FaultEntry> for FiredFault {
    fn from(entry: &FaultEntry) -> Self {
        Self {
            name: entry.name.clone(),
            kind: entry.kind.as_str().to_string(),
            extra_arg: entry.extra_arg,
            times_triggered: entry.times_triggered,
        }
    }
}

impl FiredFault {
    /// Rebuild the snapshot; `None` if the kind is not one this build knows
    pub fn into_entry(self) -> Option<FaultEntry> {
        let kind = FaultKind::parse(&self.kind)?;
        let mut entry = FaultEntry::new(self.name, kind).with_extra_arg(self.extra_arg);
        entry.times_triggered = self.times_triggered;
        entry.state = FaultState::Triggered;
        Some(entry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub fired: Option<FiredFault>,
}

/// Current kind of one fault, absent once removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedResponse {
    pub name: String,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedResponse {
    pub name: String,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::points;

    #[test]
    fn test_fired_fault_keeps_action_fields() {
        let mut entry = FaultEntry::new(points::CHECKPOINT, FaultKind::Sleep).with_extra_arg(2);
        entry.times_triggered = 3;

        let json = serde_json::to_string(&FiredFault::from(&entry)).unwrap();
        let rebuilt: FiredFault = serde_json::from_str(&json).unwrap();
        let rebuilt = rebuilt.into_entry().unwrap();

        assert_eq!(rebuilt.kind, FaultKind::Sleep);
        assert_eq!(rebuilt.extra_arg, 2);
        assert_eq!(rebuilt.times_triggered, 3);
    }

    #[test]
    fn test_unknown_kind_is_dropped() {
        let fired = FiredFault {
            name: points::CHECKPOINT.to_string(),
            kind: "explode".to_string(),
            extra_arg: 0,
            times_triggered: 1,
        };
        assert!(fired.into_entry().is_none());
    }

    #[test]
    fn test_trigger_request_defaults() {
        let request: TriggerRequest = serde_json::from_str(r#"{"name": "checkpoint"}"#).unwrap();
        assert_eq!(request.ddl, "");
        assert_eq!(request.database, "");
        assert_eq!(request.table, "");
    }
}
