//! Control surface for test drivers
//!
//! - `api`: typed operations on `FaultRegistry` (arm, reset, status,
//!   wait-until-triggered, resume, is-completed)
//! - `request`: the textual boundary (`inject_fault`) that validates raw
//!   arguments and renders a `Success:` / `Failure:` result

mod api;
mod request;

pub use api::ControlOutcome;
pub use request::{
    inject_fault, FaultRequest, InjectRequest, MAX_SLEEP_SECS, MAX_START_OCCURRENCE,
};
