//! Errors raised at a fault call site

use thiserror::Error;

/// Result type for `try_trigger`
pub type TriggerResult<T> = Result<T, TriggerError>;

/// Recoverable errors raised in the triggering segment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// An `error` fault fired; the caller's current unit of work should unwind
    #[error("fault triggered, fault name:'{name}' fault type:'error'")]
    Injected { name: String },

    /// The segment was cancelled while a fault held it
    #[error("canceling statement due to user request, fault name:'{name}'")]
    Cancelled { name: String },
}

impl TriggerError {
    pub fn code(&self) -> &'static str {
        match self {
            TriggerError::Injected { .. } => "FI_TRIGGER_INJECTED_ERROR",
            TriggerError::Cancelled { .. } => "FI_TRIGGER_CANCELLED",
        }
    }

    pub fn fault_name(&self) -> &str {
        match self {
            TriggerError::Injected { name } | TriggerError::Cancelled { name } => name,
        }
    }
}
