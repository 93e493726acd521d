//! faultinjector - deterministic fault injection for database test suites
//!
//! A test driver arms named faults in a shared registry; instrumented call
//! sites in segment workers ask the trigger engine whether a fault fires and
//! the engine carries out the armed action (sleep, error, suspend, crash...).
//! Segments in other processes reach the registry hosted by the control
//! server through `RemoteRegistry`.

pub mod cli;
pub mod config;
pub mod control;
pub mod fault;
pub mod http_server;
pub mod observability;
pub mod registry;
pub mod remote;
pub mod trigger;

pub use config::FaultInjectorConfig;
pub use control::{inject_fault, ControlOutcome, InjectRequest};
pub use fault::{DdlStatement, FaultEntry, FaultError, FaultKind, FaultState};
pub use registry::FaultRegistry;
pub use remote::RemoteRegistry;
pub use trigger::{ProcessRole, SegmentContext, TriggerError};
