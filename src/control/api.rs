//! Control API: arm, reset, status, wait, resume, completion polling
//!
//! Used by test drivers, usually from a different segment or connection
//! than the one the fault fires in. Routine failures come back as
//! `ControlOutcome::Failure`; only misuse is raised as `FaultError`.

use std::thread;
use std::time::Duration;

use crate::fault::{points, FaultEntry, FaultError, FaultKind, FaultResult, FaultState};
use crate::observability::{log_event_with_fields, Event};
use crate::registry::{log_removed, FaultRegistry};

/// Result of a control command that ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Command applied; the text is empty or a status report
    Success(String),
    /// Command ran but could not be applied; the text says why
    Failure(String),
}

impl ControlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ControlOutcome::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ControlOutcome::Success(m) | ControlOutcome::Failure(m) => m,
        }
    }

    /// Textual result for the control caller, prefixed `Success:` or `Failure:`
    pub fn render(&self) -> String {
        match self {
            ControlOutcome::Success(m) if m.is_empty() => "Success:".to_string(),
            ControlOutcome::Success(m) => format!("Success: {}", m),
            ControlOutcome::Failure(m) => format!("Failure: {}", m),
        }
    }
}

impl FaultRegistry {
    /// Arm a new fault in state Waiting with no triggers counted.
    pub fn arm(&self, entry: FaultEntry) -> ControlOutcome {
        let entry = entry.armed();
        let name = entry.name.clone();
        let kind = entry.kind;

        let result = {
            let mut store = self.lock();
            self.insert_locked(&mut store, entry)
        };

        match result {
            Ok(()) => ControlOutcome::Success(String::new()),
            Err(err) => {
                let reason = format!("could not insert fault injection, {}", err);
                log_event_with_fields(
                    Event::FaultInsertFailed,
                    &[
                        ("code", err.code()),
                        ("fault_name", &name),
                        ("fault_type", kind.as_str()),
                        ("reason", &reason),
                    ],
                );
                ControlOutcome::Failure(reason)
            }
        }
    }

    /// Remove one fault, or every fault for `points::ALL`.
    ///
    /// Returns how many entries were removed; removing an unknown name is a
    /// no-op.
    pub fn reset(&self, target: &str) -> usize {
        let removed = {
            let mut store = self.lock();
            if target == points::ALL {
                self.drain_locked(&mut store)
            } else {
                self.remove_locked(&mut store, target).into_iter().collect()
            }
        };
        log_removed(&removed);
        removed.len()
    }

    /// Report every armed fault matching `filter` (or all, for `points::ALL`).
    ///
    /// Every entry is logged regardless of the filter.
    pub fn status(&self, filter: &str) -> ControlOutcome {
        let entries = self.entries();
        let mut report = String::new();

        for entry in &entries {
            log_event_with_fields(
                Event::FaultStatus,
                &[
                    ("fault_name", &entry.name),
                    ("fault_type", entry.kind.as_str()),
                    ("ddl_statement", entry.ddl.as_str()),
                    ("database_name", &entry.database_name),
                    ("table_name", &entry.table_name),
                    ("start_occurrence", &entry.start_occurrence.to_string()),
                    ("end_occurrence", &entry.end_occurrence.as_raw().to_string()),
                    ("extra_arg", &entry.extra_arg.to_string()),
                    ("state", entry.state.as_str()),
                    ("num_times_hit", &entry.times_triggered.to_string()),
                ],
            );
            if filter == points::ALL || entry.name == filter {
                report.push_str(&entry.to_string());
                report.push_str(" \n");
            }
        }

        if report.is_empty() {
            ControlOutcome::Failure(format!("fault name:'{}' not set", filter))
        } else {
            ControlOutcome::Success(report)
        }
    }

    /// Release a suspended fault by rewriting its kind to Resume.
    pub fn resume(&self, name: &str) -> FaultResult<ControlOutcome> {
        let previous = {
            let mut store = self.lock();
            match store.lookup_mut(name) {
                None => None,
                Some(entry) if entry.kind != FaultKind::Suspend => {
                    return Err(FaultError::NotSuspended {
                        name: name.to_string(),
                        kind: entry.kind.as_str().to_string(),
                    });
                }
                Some(entry) => {
                    entry.kind = FaultKind::Resume;
                    Some(entry.state)
                }
            }
        };

        match previous {
            Some(state) => {
                log_event_with_fields(
                    Event::FaultInjected,
                    &[
                        ("fault_name", name),
                        ("fault_type", FaultKind::Resume.as_str()),
                        ("state", state.as_str()),
                    ],
                );
                Ok(ControlOutcome::Success(String::new()))
            }
            None => {
                log_event_with_fields(Event::FaultResumeMissing, &[("fault_name", name)]);
                Ok(ControlOutcome::Failure(format!(
                    "could not resume fault injection, fault name:'{}' not set",
                    name
                )))
            }
        }
    }

    /// Poll until the fault completes or has fired `expected` times within its
    /// window. Gives up after `timeout`.
    pub fn wait_until_triggered(
        &self,
        name: &str,
        expected: i32,
        timeout: Duration,
    ) -> FaultResult<ControlOutcome> {
        let interval = self.config().poll_interval();
        let mut retries_left = (timeout.as_millis() / interval.as_millis().max(1)).max(1);
        let mut polled = false;

        loop {
            let observed = self
                .lock()
                .lookup(name)
                .map(|e| (e.state, e.times_triggered, e.start_occurrence));

            let Some((state, times_triggered, start)) = observed else {
                if !polled {
                    return Err(FaultError::NotSet(name.to_string()));
                }
                return Ok(ControlOutcome::Failure(format!(
                    "fault name:'{}' was removed before it was triggered",
                    name
                )));
            };

            let advanced = i64::from(times_triggered) - i64::from(start);
            if state == FaultState::Completed || advanced >= i64::from(expected) - 1 {
                log_event_with_fields(
                    Event::FaultWaitComplete,
                    &[
                        ("fault_name", name),
                        ("num_times_hit", &times_triggered.to_string()),
                    ],
                );
                return Ok(ControlOutcome::Success(String::new()));
            }

            polled = true;
            thread::sleep(interval);
            retries_left -= 1;
            if retries_left == 0 {
                return Err(FaultError::Timeout {
                    name: name.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
        }
    }

    /// Completion poll for fire-and-forget controllers.
    ///
    /// A missing fault counts as completed. A terminal fault is removed: true
    /// if it completed, false if it failed. Anything else is left alone.
    pub fn is_completed(&self, name: &str) -> bool {
        let (completed, removed) = {
            let mut store = self.lock();
            let state = match store.lookup(name) {
                None => return true,
                Some(entry) => entry.state,
            };
            match state {
                FaultState::Waiting | FaultState::Triggered => return false,
                FaultState::Completed => (true, self.remove_locked(&mut store, name)),
                FaultState::Failed => (false, self.remove_locked(&mut store, name)),
            }
        };

        if let Some(entry) = removed {
            log_removed(std::slice::from_ref(&entry));
            if !completed {
                log_event_with_fields(
                    Event::FaultNotCompleted,
                    &[
                        ("fault_name", &entry.name),
                        ("fault_type", entry.kind.as_str()),
                    ],
                );
            }
        }
        completed
    }
}
