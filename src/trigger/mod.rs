//! Trigger engine
//!
//! Answers, for an arbitrary call site, "has this fault been armed, and if
//! so what should happen now", then makes it happen in the calling segment.
//!
//! Segments in the controller's process share the `FaultRegistry` directly.
//! Worker processes reach the registry hosted by `faultinjector serve`
//! through `remote::RemoteRegistry`; the fault still fires in the worker.
//!
//! ```ignore
//! use faultinjector::fault::{points, DdlStatement};
//!
//! // Inside a segment worker, at an instrumented call site:
//! ctx.try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")?;
//! ```

mod action;
mod engine;
mod errors;
mod host;
mod source;

pub use engine::SegmentContext;
pub use errors::{TriggerError, TriggerResult};
pub use host::{disable_core_dumps, CrashHandler, InterruptFlags, ProcessCrashHandler, ProcessRole};
pub use source::FaultSource;
