//! Trigger evaluation
//!
//! `SegmentContext::try_trigger` is the call-site hook. Matching and the
//! state transition happen under the registry lock; the action runs on a
//! snapshot after the lock is released, in the calling segment.

use std::sync::Arc;

use super::action;
use super::errors::TriggerResult;
use super::host::{CrashHandler, InterruptFlags, ProcessCrashHandler, ProcessRole};
use super::source::FaultSource;
use crate::fault::{DdlStatement, FaultKind};
use crate::registry::FaultRegistry;

/// Everything one segment worker needs to evaluate faults
///
/// `S` is where faults are looked up: the registry itself for segments in the
/// controller's process, or a `RemoteRegistry` for worker processes.
pub struct SegmentContext<S: FaultSource = FaultRegistry> {
    registry: Arc<S>,
    role: ProcessRole,
    interrupts: Arc<InterruptFlags>,
    crash_handler: Arc<dyn CrashHandler>,
}

impl<S: FaultSource> Clone for SegmentContext<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            role: self.role,
            interrupts: Arc::clone(&self.interrupts),
            crash_handler: Arc::clone(&self.crash_handler),
        }
    }
}

impl<S: FaultSource> SegmentContext<S> {
    /// A context for a segment of the given role that crashes the real process
    pub fn new(registry: Arc<S>, role: ProcessRole) -> Self {
        Self {
            registry,
            role,
            interrupts: Arc::new(InterruptFlags::new()),
            crash_handler: Arc::new(ProcessCrashHandler),
        }
    }

    pub fn with_interrupts(mut self, interrupts: Arc<InterruptFlags>) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn with_crash_handler(mut self, crash_handler: Arc<dyn CrashHandler>) -> Self {
        self.crash_handler = crash_handler;
        self
    }

    pub fn registry(&self) -> &Arc<S> {
        &self.registry
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn interrupts(&self) -> &Arc<InterruptFlags> {
        &self.interrupts
    }

    pub(crate) fn crash_handler(&self) -> &dyn CrashHandler {
        self.crash_handler.as_ref()
    }

    /// Evaluate the fault `name` for a call from the given scope.
    ///
    /// Returns `Ok(None)` when nothing fired, `Ok(Some(kind))` after a fired
    /// action completed, and `Err` when the action raised an error in this
    /// segment. Destructive kinds do not return.
    pub fn try_trigger(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> TriggerResult<Option<FaultKind>> {
        if !self.role.may_trigger(name) {
            return Ok(None);
        }

        // No lock here: a segment that died holding it must not wedge every
        // caller when nothing is armed. Missing a fault armed concurrently
        // with this check is acceptable.
        if self.registry.config().empty_registry_fast_path && self.registry.is_probably_empty() {
            return Ok(None);
        }

        let Some(snapshot) = self.registry.match_and_advance(name, ddl, database, table) else {
            return Ok(None);
        };

        action::dispatch(self, &snapshot).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaultInjectorConfig;
    use crate::fault::{points, EndOccurrence, FaultEntry, FaultState};

    fn context(fast_path: bool) -> SegmentContext {
        let registry = Arc::new(FaultRegistry::new(FaultInjectorConfig {
            empty_registry_fast_path: fast_path,
            ..Default::default()
        }));
        SegmentContext::new(registry, ProcessRole::Backend)
    }

    fn arm(ctx: &SegmentContext, entry: FaultEntry) {
        let registry = ctx.registry();
        let mut store = registry.lock();
        registry.insert_locked(&mut store, entry).unwrap();
    }

    #[test]
    fn test_nothing_armed() {
        for fast_path in [true, false] {
            let ctx = context(fast_path);
            let fired = ctx
                .try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")
                .unwrap();
            assert_eq!(fired, None);
        }
    }

    #[test]
    fn test_skip_fires_once_then_completes() {
        let ctx = context(true);
        arm(&ctx, FaultEntry::new(points::CHECKPOINT, FaultKind::Skip));

        let first = ctx
            .try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")
            .unwrap();
        assert_eq!(first, Some(FaultKind::Skip));

        let second = ctx
            .try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")
            .unwrap();
        assert_eq!(second, None);

        let entry = ctx.registry().snapshot(points::CHECKPOINT).unwrap();
        assert_eq!(entry.state, FaultState::Completed);
        assert_eq!(entry.times_triggered, 1);
    }

    #[test]
    fn test_other_name_not_counted() {
        let ctx = context(true);
        arm(&ctx, FaultEntry::new(points::CHECKPOINT, FaultKind::Skip));

        ctx.try_trigger(points::FTS_PROBE, DdlStatement::NotSpecified, "", "")
            .unwrap();
        let entry = ctx.registry().snapshot(points::CHECKPOINT).unwrap();
        assert_eq!(entry.times_triggered, 0);
        assert_eq!(entry.state, FaultState::Waiting);
    }

    #[test]
    fn test_table_filter() {
        let ctx = context(true);
        arm(
            &ctx,
            FaultEntry::new(points::APPENDONLY_INSERT, FaultKind::Skip)
                .with_table("t1")
                .with_occurrences(1, EndOccurrence::Infinite),
        );

        let other = ctx
            .try_trigger(points::APPENDONLY_INSERT, DdlStatement::NotSpecified, "", "t2")
            .unwrap();
        assert_eq!(other, None);
        let same = ctx
            .try_trigger(points::APPENDONLY_INSERT, DdlStatement::NotSpecified, "", "t1")
            .unwrap();
        assert_eq!(same, Some(FaultKind::Skip));
    }

    #[test]
    fn test_launcher_bypasses_registry() {
        let registry = Arc::new(FaultRegistry::default());
        let ctx = SegmentContext::new(Arc::clone(&registry), ProcessRole::AutovacuumLauncher);
        {
            let mut store = registry.lock();
            registry
                .insert_locked(&mut store, FaultEntry::new(points::CHECKPOINT, FaultKind::Skip))
                .unwrap();
        }

        let fired = ctx
            .try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")
            .unwrap();
        assert_eq!(fired, None);
        assert_eq!(registry.snapshot(points::CHECKPOINT).unwrap().times_triggered, 0);
    }
}
