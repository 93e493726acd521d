//! Observability for the fault injector
//!
//! Structured JSON logging of typed lifecycle events. Logging is the only
//! side effect here; it never alters registry state.
//!
//! # Usage
//!
//! ```ignore
//! use faultinjector::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::FaultTriggered, &[("fault_name", "checkpoint")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
