//! Observable fault injector events
//!
//! Events are explicit and typed; each maps to one stable string.

use std::fmt;

use super::logger::Severity;

/// Observable events in the fault injector lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A registry was constructed for this host
    RegistryInitialized,
    /// A control command is about to be applied
    InjectRequested,
    /// A fault was armed (or a control command succeeded)
    FaultInjected,
    /// A fault could not be inserted into the registry
    FaultInsertFailed,
    /// A fault fired at a call site
    FaultTriggered,
    /// A fault fired and is about to terminate the segment
    FaultTriggeredFatal,
    /// A fault fired and raised an error in the segment
    FaultTriggeredError,
    /// A suspended segment observed the resume signal
    FaultResumed,
    /// A suspended segment observed that its entry was removed
    FaultReleased,
    /// A fault was removed from the registry
    FaultRemoved,
    /// A status line for one registry entry
    FaultStatus,
    /// A fault reached a terminal state without completing
    FaultNotCompleted,
    /// A wait-until-triggered poll observed the expected triggers
    FaultWaitComplete,
    /// A resume was requested for a fault that is not armed
    FaultResumeMissing,
    /// Core dumps could not be disabled before a crash action
    CoreDumpDisableFailed,
    /// The control server is accepting connections
    ControlServerStart,
    /// A worker process could not reach the control server's registry
    RemoteRegistryUnavailable,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RegistryInitialized => "FAULT_REGISTRY_INITIALIZED",
            Event::InjectRequested => "FAULT_INJECT_REQUESTED",
            Event::FaultInjected => "FAULT_INJECTED",
            Event::FaultInsertFailed => "FAULT_INSERT_FAILED",
            Event::FaultTriggered => "FAULT_TRIGGERED",
            Event::FaultTriggeredFatal => "FAULT_TRIGGERED_FATAL",
            Event::FaultTriggeredError => "FAULT_TRIGGERED_ERROR",
            Event::FaultResumed => "FAULT_RESUMED",
            Event::FaultReleased => "FAULT_RELEASED",
            Event::FaultRemoved => "FAULT_REMOVED",
            Event::FaultStatus => "FAULT_STATUS",
            Event::FaultNotCompleted => "FAULT_NOT_COMPLETED",
            Event::FaultWaitComplete => "FAULT_WAIT_COMPLETE",
            Event::FaultResumeMissing => "FAULT_RESUME_MISSING",
            Event::CoreDumpDisableFailed => "CORE_DUMP_DISABLE_FAILED",
            Event::ControlServerStart => "CONTROL_SERVER_START",
            Event::RemoteRegistryUnavailable => "REMOTE_REGISTRY_UNAVAILABLE",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::InjectRequested => Severity::Trace,
            Event::FaultInsertFailed
            | Event::FaultNotCompleted
            | Event::FaultResumeMissing
            | Event::CoreDumpDisableFailed
            | Event::RemoteRegistryUnavailable => Severity::Warn,
            Event::FaultTriggeredError => Severity::Error,
            Event::FaultTriggeredFatal => Severity::Fatal,
            _ => Severity::Info,
        }
    }

    /// Returns true if the segment terminates right after this event
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::FaultTriggeredFatal)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
