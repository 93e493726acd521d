//! Destructive And Signalling Fault Tests
//!
//! Fatal, panic and segv faults hand the segment to its `CrashHandler`. A
//! recording handler that unwinds stands in for process termination here.
//! Interrupt and finish-pending faults only raise the segment's flags.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use faultinjector::fault::{points, DdlStatement, FaultEntry, FaultKind, FaultState};
use faultinjector::registry::FaultRegistry;
use faultinjector::trigger::{
    CrashHandler, InterruptFlags, ProcessRole, SegmentContext, TriggerError,
};

/// Records the crash and unwinds instead of terminating
#[derive(Default)]
struct RecordingCrashHandler {
    crashes: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingCrashHandler {
    fn record(&self, how: &'static str, fault_name: &str) -> ! {
        self.crashes
            .lock()
            .unwrap()
            .push((how, fault_name.to_string()));
        panic!("segment terminated by {} fault '{}'", how, fault_name);
    }

    fn crashes(&self) -> Vec<(&'static str, String)> {
        self.crashes.lock().unwrap().clone()
    }
}

impl CrashHandler for RecordingCrashHandler {
    fn fatal(&self, fault_name: &str) -> ! {
        self.record("fatal", fault_name)
    }

    fn panic(&self, fault_name: &str) -> ! {
        self.record("panic", fault_name)
    }

    fn segv(&self, fault_name: &str) -> ! {
        self.record("segv", fault_name)
    }
}

fn segment() -> (SegmentContext, Arc<RecordingCrashHandler>) {
    let handler = Arc::new(RecordingCrashHandler::default());
    let ctx = SegmentContext::new(Arc::new(FaultRegistry::default()), ProcessRole::Backend)
        .with_crash_handler(handler.clone());
    (ctx, handler)
}

fn trigger(ctx: &SegmentContext, name: &str) -> Result<Option<FaultKind>, TriggerError> {
    ctx.try_trigger(name, DdlStatement::NotSpecified, "", "")
}

// =============================================================================
// CRASHING KINDS
// =============================================================================

/// Test: Each destructive kind reaches its crash handler and never returns.
#[test]
fn test_destructive_kinds_reach_handler() {
    let cases = [
        (FaultKind::Fatal, "fatal"),
        (FaultKind::Panic, "panic"),
        (FaultKind::Segv, "segv"),
    ];

    for (kind, how) in cases {
        let (ctx, handler) = segment();
        ctx.registry()
            .arm(FaultEntry::new(points::PROMOTE_MIRROR, kind));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| trigger(&ctx, points::PROMOTE_MIRROR)));
        assert!(outcome.is_err(), "{} returned to the caller", kind);
        assert_eq!(
            handler.crashes(),
            vec![(how, points::PROMOTE_MIRROR.to_string())]
        );

        // The lock was released before the crash; the registry is still usable
        let entry = ctx.registry().snapshot(points::PROMOTE_MIRROR).unwrap();
        assert_eq!(entry.state, FaultState::Completed);
        assert_eq!(entry.times_triggered, 1);
    }
}

/// Test: A destructive fault outside its window does nothing.
#[test]
fn test_destructive_kind_waits_for_window() {
    let (ctx, handler) = segment();
    ctx.registry().arm(
        FaultEntry::new(points::CHECKPOINT, FaultKind::Panic)
            .with_occurrences(2, faultinjector::fault::EndOccurrence::At(2)),
    );

    assert_eq!(trigger(&ctx, points::CHECKPOINT), Ok(None));
    assert!(handler.crashes().is_empty());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| trigger(&ctx, points::CHECKPOINT)));
    assert!(outcome.is_err());
    assert_eq!(handler.crashes().len(), 1);
}

// =============================================================================
// SIGNALLING KINDS
// =============================================================================

/// Test: An interrupt fault raises a cancellation consumed at the next check.
#[test]
fn test_interrupt_fault() {
    let interrupts = Arc::new(InterruptFlags::new());
    let (ctx, _) = segment();
    let ctx = ctx.with_interrupts(interrupts.clone());
    ctx.registry()
        .arm(FaultEntry::new(points::QUERY_CANCEL_DURING_EXECUTION, FaultKind::Interrupt));

    assert_eq!(
        trigger(&ctx, points::QUERY_CANCEL_DURING_EXECUTION),
        Ok(Some(FaultKind::Interrupt))
    );
    assert!(interrupts.interrupt_pending());
    assert!(interrupts.query_cancel_pending());

    let err = interrupts.check_for_interrupts("executor").unwrap_err();
    assert_eq!(err.code(), "FI_TRIGGER_CANCELLED");
    assert!(!interrupts.interrupt_pending());
}

/// Test: A finish-pending fault sets the cancel flag without an interrupt.
#[test]
fn test_finish_pending_fault() {
    let interrupts = Arc::new(InterruptFlags::new());
    let (ctx, _) = segment();
    let ctx = ctx.with_interrupts(interrupts.clone());
    ctx.registry()
        .arm(FaultEntry::new(points::DTM_BROADCAST_COMMIT_PREPARED, FaultKind::FinishPending));

    assert_eq!(
        trigger(&ctx, points::DTM_BROADCAST_COMMIT_PREPARED),
        Ok(Some(FaultKind::FinishPending))
    );
    assert!(interrupts.query_cancel_pending());
    assert!(!interrupts.interrupt_pending());

    // Nothing happens until an interrupt arrives
    assert_eq!(interrupts.check_for_interrupts("executor"), Ok(()));

    interrupts.request_cancel();
    assert!(interrupts.check_for_interrupts("executor").is_err());
}

/// Test: A resume-kind entry matches but performs no action.
#[test]
fn test_resume_kind_is_inert() {
    let (ctx, handler) = segment();
    ctx.registry()
        .arm(FaultEntry::new(points::CHECKPOINT, FaultKind::Resume));

    assert_eq!(trigger(&ctx, points::CHECKPOINT), Ok(Some(FaultKind::Resume)));
    assert!(handler.crashes().is_empty());
}
