//! Worker-process access to the control server's registry
//!
//! `faultinjector serve` hosts the one registry. Worker processes evaluate
//! their call sites against it through `RemoteRegistry`: the server matches
//! and counts under its lock, and the action runs in the worker, so a
//! destructive fault terminates the worker and never the server.
//!
//! ```ignore
//! use std::sync::Arc;
//! use faultinjector::remote::RemoteRegistry;
//! use faultinjector::trigger::{ProcessRole, SegmentContext};
//!
//! let remote = Arc::new(RemoteRegistry::new("http://127.0.0.1:7878")?);
//! let ctx = SegmentContext::new(remote, ProcessRole::Backend);
//! ```

mod client;
mod errors;
pub mod wire;

pub use client::RemoteRegistry;
pub use errors::{RemoteError, RemoteResult};
