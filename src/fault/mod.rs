//! Fault definitions
//!
//! The data model shared by the registry, the trigger engine and the
//! control API: what a fault does (`FaultKind`), where it applies
//! (`DdlStatement`, database and table filters), when it fires
//! (`start_occurrence..=end_occurrence`), and how far it has got
//! (`FaultState`).

mod entry;
mod errors;
mod kind;
pub mod points;

pub use entry::{
    truncate_identifier, EndOccurrence, FaultEntry, FAULT_NAME_MAX_LENGTH,
    INFINITE_END_OCCURRENCE, NAME_DATA_LEN,
};
pub use errors::{FaultError, FaultResult};
pub use kind::{DdlStatement, FaultCommand, FaultKind, FaultState};
