//! Where a segment looks faults up
//!
//! A segment either shares the registry in-process (`FaultRegistry`) or
//! reaches the registry hosted by the control server from another process
//! (`remote::RemoteRegistry`). The engine only needs these four operations.

use crate::config::FaultInjectorConfig;
use crate::fault::{DdlStatement, FaultEntry, FaultKind};
use crate::registry::FaultRegistry;

/// The registry operations a segment performs at a call site
pub trait FaultSource: Send + Sync {
    /// Poll interval and loop budgets for blocking actions
    fn config(&self) -> &FaultInjectorConfig;

    /// Cheap hint that nothing is armed; may be stale, never takes the lock
    fn is_probably_empty(&self) -> bool;

    /// Match and count one call under the registry lock; the snapshot of the
    /// entry is returned only if the fault fires.
    fn match_and_advance(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> Option<FaultEntry>;

    /// Current kind of the fault, or `None` once it is removed
    fn armed_kind(&self, name: &str) -> Option<FaultKind>;
}

impl FaultSource for FaultRegistry {
    fn config(&self) -> &FaultInjectorConfig {
        FaultRegistry::config(self)
    }

    fn is_probably_empty(&self) -> bool {
        FaultRegistry::is_probably_empty(self)
    }

    fn match_and_advance(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> Option<FaultEntry> {
        FaultRegistry::match_and_advance(self, name, ddl, database, table)
    }

    fn armed_kind(&self, name: &str) -> Option<FaultKind> {
        FaultRegistry::armed_kind(self, name)
    }
}
