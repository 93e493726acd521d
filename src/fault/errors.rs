//! Control-caller errors
//!
//! These are raised back to whoever issued the control command. None of them
//! leave the registry in a modified state. Routine control failures
//! (capacity, duplicates, vanished entries) are not errors; they come back as
//! `ControlOutcome::Failure`.

use thiserror::Error;

/// Result type for control operations
pub type FaultResult<T> = Result<T, FaultError>;

/// Errors raised to the control caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    // ==================
    // Request Validation
    // ==================
    /// Fault name is not in the vocabulary
    #[error("could not recognize fault name '{0}'")]
    UnknownFaultName(String),

    /// Fault type is not in the vocabulary
    #[error("could not recognize fault type '{0}'")]
    UnknownFaultType(String),

    /// Arm command addressed to a name that selects every fault
    #[error("fault name '{0}' is reserved and cannot be armed")]
    ReservedFaultName(String),

    /// DDL scope is not in the vocabulary
    #[error("could not recognize DDL statement '{0}'")]
    UnknownDdlStatement(String),

    /// Sleep outside [0, 7200]
    #[error("invalid sleep time {0}, allowed range [0, 7200 sec]")]
    InvalidSleepTime(i32),

    /// Start outside [1, 1000]
    #[error("invalid start occurrence number {0}, allowed range [1, 1000]")]
    InvalidStartOccurrence(i32),

    /// End neither -1 nor >= start
    #[error("invalid end occurrence number {0}, allowed range [startOccurrence, ] or -1")]
    InvalidEndOccurrence(i32),

    // ==================
    // Command Usage
    // ==================
    /// Resume issued against a fault that is not suspended
    #[error("only suspend fault can be resumed, fault name:'{name}' fault type:'{kind}'")]
    NotSuspended { name: String, kind: String },

    /// Wait issued against a fault that was never armed
    #[error("fault not set, fault name:'{0}'")]
    NotSet(String),

    /// Wait exceeded its retry budget
    #[error(
        "fault not triggered, fault name:'{name}' fault type:'wait_until_triggered' \
         (timed out after {seconds} seconds max wait)"
    )]
    Timeout { name: String, seconds: u64 },
}

impl FaultError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FaultError::UnknownFaultName(_) => "FI_FAULT_UNKNOWN_NAME",
            FaultError::UnknownFaultType(_) => "FI_FAULT_UNKNOWN_TYPE",
            FaultError::ReservedFaultName(_) => "FI_FAULT_RESERVED_NAME",
            FaultError::UnknownDdlStatement(_) => "FI_FAULT_UNKNOWN_DDL",
            FaultError::InvalidSleepTime(_) => "FI_FAULT_INVALID_SLEEP",
            FaultError::InvalidStartOccurrence(_) => "FI_FAULT_INVALID_START",
            FaultError::InvalidEndOccurrence(_) => "FI_FAULT_INVALID_END",
            FaultError::NotSuspended { .. } => "FI_FAULT_NOT_SUSPENDED",
            FaultError::NotSet(_) => "FI_FAULT_NOT_SET",
            FaultError::Timeout { .. } => "FI_FAULT_WAIT_TIMEOUT",
        }
    }

    /// Malformed request, as opposed to a command that ran and failed
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            FaultError::UnknownFaultName(_)
                | FaultError::UnknownFaultType(_)
                | FaultError::ReservedFaultName(_)
                | FaultError::UnknownDdlStatement(_)
                | FaultError::InvalidSleepTime(_)
                | FaultError::InvalidStartOccurrence(_)
                | FaultError::InvalidEndOccurrence(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_names_fault_and_bound() {
        let err = FaultError::Timeout {
            name: "checkpoint".to_string(),
            seconds: 600,
        };
        let msg = err.to_string();
        assert!(msg.contains("'checkpoint'"));
        assert!(msg.contains("600 seconds"));
        assert_eq!(err.code(), "FI_FAULT_WAIT_TIMEOUT");
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_not_suspended_message() {
        let err = FaultError::NotSuspended {
            name: "checkpoint".to_string(),
            kind: "sleep".to_string(),
        };
        assert!(err.to_string().starts_with("only suspend fault can be resumed"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(FaultError::InvalidSleepTime(9000).is_validation_error());
        assert!(FaultError::UnknownFaultName("x".into()).is_validation_error());
        assert!(FaultError::ReservedFaultName("all".into()).is_validation_error());
        assert!(!FaultError::NotSet("x".into()).is_validation_error());
    }
}
