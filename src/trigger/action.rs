//! Fault action dispatch
//!
//! Runs on the snapshot taken under the lock, with the lock released. Every
//! long wait here is a polling loop that re-takes the lock only to re-check
//! the entry.

use std::thread;
use std::time::Duration;

use super::engine::SegmentContext;
use super::errors::{TriggerError, TriggerResult};
use super::source::FaultSource;
use crate::fault::{FaultEntry, FaultKind};
use crate::observability::{log_event_with_fields, Event};

pub(crate) fn dispatch<S: FaultSource>(
    ctx: &SegmentContext<S>,
    fault: &FaultEntry,
) -> TriggerResult<FaultKind> {
    let name = fault.name.as_str();

    match fault.kind {
        FaultKind::Sleep => {
            log_triggered(Event::FaultTriggered, fault);
            let seconds = u64::try_from(fault.extra_arg).unwrap_or(0);
            thread::sleep(Duration::from_secs(seconds));
        }
        FaultKind::Fatal => {
            log_triggered(Event::FaultTriggeredFatal, fault);
            ctx.crash_handler().fatal(name)
        }
        FaultKind::Panic => {
            log_triggered(Event::FaultTriggeredFatal, fault);
            ctx.crash_handler().panic(name)
        }
        FaultKind::Segv => {
            log_triggered(Event::FaultTriggeredFatal, fault);
            ctx.crash_handler().segv(name)
        }
        FaultKind::Error => {
            log_triggered(Event::FaultTriggeredError, fault);
            return Err(TriggerError::Injected {
                name: name.to_string(),
            });
        }
        FaultKind::InfiniteLoop => {
            log_triggered(Event::FaultTriggered, fault);
            spin_until_removed(ctx, name)?;
        }
        FaultKind::Suspend => {
            log_triggered(Event::FaultTriggered, fault);
            suspend_until_resumed(ctx, name)?;
        }
        FaultKind::Skip => {
            log_triggered(Event::FaultTriggered, fault);
        }
        FaultKind::Resume => {}
        FaultKind::Interrupt => {
            // The call site must hold off interrupts around this fault, or the
            // flags are consumed by the fault injector's own polling.
            log_triggered(Event::FaultTriggered, fault);
            ctx.interrupts().raise_interrupt();
        }
        FaultKind::FinishPending => {
            log_triggered(Event::FaultTriggered, fault);
            ctx.interrupts().raise_finish_pending();
        }
    }

    Ok(fault.kind)
}

/// Poll until the entry is removed, the iteration budget runs out, or the
/// segment is cancelled.
fn spin_until_removed<S: FaultSource>(ctx: &SegmentContext<S>, name: &str) -> TriggerResult<()> {
    let registry = ctx.registry();
    let interval = registry.config().poll_interval();

    for _ in 0..registry.config().infinite_loop_max_iterations {
        if registry.armed_kind(name).is_none() {
            break;
        }
        thread::sleep(interval);
        ctx.interrupts().check_for_interrupts(name)?;
    }
    Ok(())
}

/// Poll until the entry's kind is rewritten to Resume or the entry is gone.
fn suspend_until_resumed<S: FaultSource>(ctx: &SegmentContext<S>, name: &str) -> TriggerResult<()> {
    let registry = ctx.registry();
    let interval = registry.config().poll_interval();

    loop {
        match registry.armed_kind(name) {
            None => {
                log_event_with_fields(Event::FaultReleased, &[("fault_name", name)]);
                return Ok(());
            }
            Some(FaultKind::Resume) => {
                log_event_with_fields(
                    Event::FaultResumed,
                    &[("fault_name", name), ("fault_type", FaultKind::Resume.as_str())],
                );
                return Ok(());
            }
            Some(_) => {}
        }
        ctx.interrupts().check_for_interrupts(name)?;
        thread::sleep(interval);
    }
}

fn log_triggered(event: Event, fault: &FaultEntry) {
    log_event_with_fields(
        event,
        &[
            ("fault_name", &fault.name),
            ("fault_type", fault.kind.as_str()),
            ("num_times_hit", &fault.times_triggered.to_string()),
        ],
    );
}
