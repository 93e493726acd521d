//! Host collaborators seen by the trigger engine
//!
//! - `ProcessRole`: what kind of segment worker is calling
//! - `InterruptFlags`: cooperative cancellation flags the host loop observes
//! - `CrashHandler`: how destructive faults terminate the calling segment

use std::sync::atomic::{AtomicBool, Ordering};

use super::errors::{TriggerError, TriggerResult};
use crate::fault::points;
use crate::observability::{log_event_with_fields, Event};

/// Role of the segment worker evaluating a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// Regular query-serving backend
    Backend,
    /// Background writer, checkpointer, WAL sender and similar helpers
    Auxiliary,
    /// Autovacuum launcher
    AutovacuumLauncher,
    /// Autovacuum worker
    AutovacuumWorker,
}

impl ProcessRole {
    /// Autovacuum runs at unpredictable times relative to test setup, so it
    /// only sees the faults on its allow-list; the launcher sees none.
    pub fn may_trigger(&self, fault_name: &str) -> bool {
        match self {
            ProcessRole::AutovacuumLauncher => false,
            ProcessRole::AutovacuumWorker => {
                points::autovacuum_worker_allowed().contains(&fault_name)
            }
            ProcessRole::Backend | ProcessRole::Auxiliary => true,
        }
    }
}

/// Cancellation flags shared between a segment and whoever may cancel it
#[derive(Debug, Default)]
pub struct InterruptFlags {
    interrupt_pending: AtomicBool,
    query_cancel_pending: AtomicBool,
}

impl InterruptFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator cancellation of the segment's current work
    pub fn request_cancel(&self) {
        self.query_cancel_pending.store(true, Ordering::SeqCst);
        self.interrupt_pending.store(true, Ordering::SeqCst);
    }

    /// Effect of an `interrupt` fault
    pub fn raise_interrupt(&self) {
        self.request_cancel();
    }

    /// Effect of a `finish_pending` fault; acted on at the next interrupt
    pub fn raise_finish_pending(&self) {
        self.query_cancel_pending.store(true, Ordering::SeqCst);
    }

    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending.load(Ordering::SeqCst)
    }

    pub fn query_cancel_pending(&self) -> bool {
        self.query_cancel_pending.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.interrupt_pending.store(false, Ordering::SeqCst);
        self.query_cancel_pending.store(false, Ordering::SeqCst);
    }

    /// Consume a pending cancellation, if any.
    ///
    /// Nothing happens unless an interrupt is pending; then a pending query
    /// cancel becomes `TriggerError::Cancelled`.
    pub fn check_for_interrupts(&self, fault_name: &str) -> TriggerResult<()> {
        if !self.interrupt_pending.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if self.query_cancel_pending.swap(false, Ordering::SeqCst) {
            return Err(TriggerError::Cancelled {
                name: fault_name.to_string(),
            });
        }
        Ok(())
    }
}

/// Terminates the calling segment for destructive faults
///
/// Implementations must not return; these faults are never turned into a
/// recoverable error.
pub trait CrashHandler: Send + Sync {
    /// Terminate the segment (FATAL)
    fn fatal(&self, fault_name: &str) -> !;

    /// Abort the segment without a core dump (PANIC)
    fn panic(&self, fault_name: &str) -> !;

    /// Crash the segment with a segmentation fault, without a core dump
    fn segv(&self, fault_name: &str) -> !;
}

/// Terminates the real operating-system process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCrashHandler;

impl CrashHandler for ProcessCrashHandler {
    fn fatal(&self, _fault_name: &str) -> ! {
        std::process::exit(1)
    }

    fn panic(&self, _fault_name: &str) -> ! {
        disable_core_dumps();
        std::process::abort()
    }

    fn segv(&self, _fault_name: &str) -> ! {
        disable_core_dumps();
        raise_segv();
        std::process::abort()
    }
}

/// Zero the soft core-file limit so crash tests don't fill the disk.
#[cfg(unix)]
pub fn disable_core_dumps() {
    // SAFETY: getrlimit/setrlimit only read and write the struct we pass.
    let failed = unsafe {
        let mut limit: libc::rlimit = std::mem::zeroed();
        if libc::getrlimit(libc::RLIMIT_CORE, &mut limit) != 0 {
            true
        } else {
            limit.rlim_cur = 0;
            libc::setrlimit(libc::RLIMIT_CORE, &limit) != 0
        }
    };
    if failed {
        let error = std::io::Error::last_os_error().to_string();
        log_event_with_fields(Event::CoreDumpDisableFailed, &[("error", &error)]);
    }
}

#[cfg(not(unix))]
pub fn disable_core_dumps() {}

#[cfg(unix)]
fn raise_segv() {
    // SAFETY: raising a signal on ourselves; SIGSEGV's default action
    // terminates the process.
    unsafe {
        libc::raise(libc::SIGSEGV);
    }
}

#[cfg(not(unix))]
fn raise_segv() {}
