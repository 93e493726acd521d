//! Injection requests: the textual control boundary
//!
//! An `InjectRequest` carries the raw arguments an administrative caller
//! sends (fault name, type, DDL scope, database, table, start/end occurrence,
//! extra argument). Validation happens here, never inside the engine; the
//! validated `FaultRequest` is then dispatched by
//! `FaultRegistry::set_fault_injection`.

use serde::{Deserialize, Serialize};

use super::api::ControlOutcome;
use crate::config::FaultInjectorConfig;
use crate::fault::{
    points, truncate_identifier, DdlStatement, EndOccurrence, FaultCommand, FaultEntry, FaultError,
    FaultKind, FaultResult, INFINITE_END_OCCURRENCE,
};
use crate::observability::{log_event_with_fields, Event};
use crate::registry::FaultRegistry;

/// Longest sleep a `sleep` fault may request, in seconds
pub const MAX_SLEEP_SECS: i32 = 7200;

/// Highest start occurrence a fault may request
pub const MAX_START_OCCURRENCE: i32 = 1000;

/// Raw control command as received from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectRequest {
    pub name: String,

    #[serde(rename = "type")]
    pub fault_type: String,

    #[serde(default)]
    pub ddl: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub table: String,

    #[serde(default = "default_start")]
    pub start: i32,

    #[serde(default = "default_end")]
    pub end: i32,

    #[serde(default)]
    pub extra: i32,
}

fn default_start() -> i32 {
    1
}
fn default_end() -> i32 {
    1
}

impl InjectRequest {
    /// A request firing once on the first matching call, in any scope
    pub fn new(name: impl Into<String>, fault_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fault_type: fault_type.into(),
            ddl: String::new(),
            database: String::new(),
            table: String::new(),
            start: default_start(),
            end: default_end(),
            extra: 0,
        }
    }

    pub fn ddl(mut self, ddl: impl Into<String>) -> Self {
        self.ddl = ddl.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn occurrences(mut self, start: i32, end: i32) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Fire from `start` on, forever
    pub fn from_occurrence(self, start: i32) -> Self {
        self.occurrences(start, INFINITE_END_OCCURRENCE)
    }

    pub fn extra(mut self, extra: i32) -> Self {
        self.extra = extra;
        self
    }

    /// Check every argument against its vocabulary or range
    pub fn validate(&self, config: &FaultInjectorConfig) -> FaultResult<FaultRequest> {
        if !config.is_known_fault(&self.name) {
            return Err(FaultError::UnknownFaultName(self.name.clone()));
        }

        let command = FaultCommand::parse(&self.fault_type)
            .ok_or_else(|| FaultError::UnknownFaultType(self.fault_type.clone()))?;

        // "all" selects every entry for reset and status; it never names one
        if matches!(command, FaultCommand::Arm(_)) && self.name == points::ALL {
            return Err(FaultError::ReservedFaultName(self.name.clone()));
        }

        if command == FaultCommand::Arm(FaultKind::Sleep)
            && !(0..=MAX_SLEEP_SECS).contains(&self.extra)
        {
            return Err(FaultError::InvalidSleepTime(self.extra));
        }

        let ddl = DdlStatement::parse(&self.ddl)
            .ok_or_else(|| FaultError::UnknownDdlStatement(self.ddl.clone()))?;

        if !(1..=MAX_START_OCCURRENCE).contains(&self.start) {
            return Err(FaultError::InvalidStartOccurrence(self.start));
        }

        let end_occurrence = match EndOccurrence::from_raw(self.end) {
            Some(EndOccurrence::At(end)) if (end as i32) < self.start => None,
            other => other,
        }
        .ok_or(FaultError::InvalidEndOccurrence(self.end))?;

        Ok(FaultRequest {
            name: self.name.clone(),
            command,
            ddl,
            database_name: truncate_identifier(&self.database).to_string(),
            table_name: truncate_identifier(&self.table).to_string(),
            start_occurrence: self.start as u32,
            end_occurrence,
            extra_arg: self.extra,
        })
    }
}

/// A validated control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRequest {
    pub name: String,
    pub command: FaultCommand,
    pub ddl: DdlStatement,
    pub database_name: String,
    pub table_name: String,
    pub start_occurrence: u32,
    pub end_occurrence: EndOccurrence,
    pub extra_arg: i32,
}

impl FaultRequest {
    /// The entry an arm command installs
    pub fn to_entry(&self, kind: FaultKind) -> FaultEntry {
        FaultEntry::new(self.name.clone(), kind)
            .with_ddl(self.ddl)
            .with_database(&self.database_name)
            .with_table(&self.table_name)
            .with_occurrences(self.start_occurrence, self.end_occurrence)
            .with_extra_arg(self.extra_arg)
    }
}

impl FaultRegistry {
    /// Apply a validated control command.
    ///
    /// Anything that is not reset, status, wait or resume arms a new fault.
    pub fn set_fault_injection(&self, request: &FaultRequest) -> FaultResult<ControlOutcome> {
        match request.command {
            FaultCommand::Reset => {
                self.reset(&request.name);
                Ok(ControlOutcome::Success(String::new()))
            }
            FaultCommand::WaitUntilTriggered => {
                let timeout = self.config().wait_timeout();
                self.wait_until_triggered(&request.name, request.extra_arg, timeout)
            }
            FaultCommand::Status => Ok(self.status(&request.name)),
            FaultCommand::Resume => self.resume(&request.name),
            FaultCommand::Arm(kind) => Ok(self.arm(request.to_entry(kind))),
        }
    }
}

/// Validate and apply a textual control command.
///
/// Returns `Success:` (or the status report) and `Failure: <reason>` as text;
/// invalid arguments and command misuse are raised as `FaultError`.
pub fn inject_fault(registry: &FaultRegistry, request: &InjectRequest) -> FaultResult<String> {
    log_event_with_fields(
        Event::InjectRequested,
        &[
            ("fault_name", &request.name),
            ("fault_type", &request.fault_type),
            ("ddl_statement", &request.ddl),
            ("database_name", &request.database),
            ("table_name", &request.table),
            ("start_occurrence", &request.start.to_string()),
            ("end_occurrence", &request.end.to_string()),
            ("extra_arg", &request.extra.to_string()),
        ],
    );

    let validated = request.validate(registry.config())?;
    let outcome = registry.set_fault_injection(&validated)?;

    if outcome.is_success() && validated.command != FaultCommand::Status {
        log_event_with_fields(
            Event::FaultInjected,
            &[
                ("fault_name", &validated.name),
                ("fault_type", validated.command.as_str()),
            ],
        );
    }
    Ok(outcome.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FaultInjectorConfig {
        FaultInjectorConfig::default()
    }

    #[test]
    fn test_defaults_fire_once() {
        let request = InjectRequest::new(points::CHECKPOINT, "skip")
            .validate(&config())
            .unwrap();
        assert_eq!(request.command, FaultCommand::Arm(FaultKind::Skip));
        assert_eq!(request.start_occurrence, 1);
        assert_eq!(request.end_occurrence, EndOccurrence::At(1));
        assert_eq!(request.ddl, DdlStatement::NotSpecified);
    }

    #[test]
    fn test_unknown_name() {
        let err = InjectRequest::new("no_such_fault", "skip")
            .validate(&config())
            .unwrap_err();
        assert_eq!(err, FaultError::UnknownFaultName("no_such_fault".into()));
    }

    #[test]
    fn test_unknown_type() {
        let err = InjectRequest::new(points::CHECKPOINT, "explode")
            .validate(&config())
            .unwrap_err();
        assert_eq!(err, FaultError::UnknownFaultType("explode".into()));
    }

    #[test]
    fn test_all_cannot_be_armed() {
        for kind in ["skip", "suspend", "sleep", "fatal"] {
            let err = InjectRequest::new(points::ALL, kind)
                .validate(&config())
                .unwrap_err();
            assert_eq!(err, FaultError::ReservedFaultName(points::ALL.into()));
            assert_eq!(err.code(), "FI_FAULT_RESERVED_NAME");
        }

        // Still valid as a selector
        for selector in ["reset", "status"] {
            assert!(InjectRequest::new(points::ALL, selector)
                .validate(&config())
                .is_ok());
        }
    }

    #[test]
    fn test_unknown_ddl() {
        let err = InjectRequest::new(points::CHECKPOINT, "skip")
            .ddl("create_view")
            .validate(&config())
            .unwrap_err();
        assert_eq!(err.code(), "FI_FAULT_UNKNOWN_DDL");
    }

    #[test]
    fn test_sleep_range() {
        for ok in [0, 1, MAX_SLEEP_SECS] {
            assert!(InjectRequest::new(points::CHECKPOINT, "sleep")
                .extra(ok)
                .validate(&config())
                .is_ok());
        }
        for bad in [-1, MAX_SLEEP_SECS + 1] {
            assert_eq!(
                InjectRequest::new(points::CHECKPOINT, "sleep")
                    .extra(bad)
                    .validate(&config())
                    .unwrap_err(),
                FaultError::InvalidSleepTime(bad)
            );
        }
        // Only sleep bounds extra
        assert!(InjectRequest::new(points::CHECKPOINT, "wait_until_triggered")
            .extra(9000)
            .validate(&config())
            .is_ok());
    }

    #[test]
    fn test_start_range() {
        for bad in [0, MAX_START_OCCURRENCE + 1] {
            let err = InjectRequest::new(points::CHECKPOINT, "skip")
                .occurrences(bad, INFINITE_END_OCCURRENCE)
                .validate(&config())
                .unwrap_err();
            assert_eq!(err, FaultError::InvalidStartOccurrence(bad));
        }
    }

    #[test]
    fn test_end_range() {
        let err = InjectRequest::new(points::CHECKPOINT, "skip")
            .occurrences(5, 4)
            .validate(&config())
            .unwrap_err();
        assert_eq!(err, FaultError::InvalidEndOccurrence(4));

        let err = InjectRequest::new(points::CHECKPOINT, "skip")
            .occurrences(1, -5)
            .validate(&config())
            .unwrap_err();
        assert_eq!(err, FaultError::InvalidEndOccurrence(-5));

        let ok = InjectRequest::new(points::CHECKPOINT, "skip")
            .from_occurrence(5)
            .validate(&config())
            .unwrap();
        assert_eq!(ok.end_occurrence, EndOccurrence::Infinite);
    }

    #[test]
    fn test_inject_fault_renders_text() {
        let registry = FaultRegistry::default();

        let armed = inject_fault(&registry, &InjectRequest::new(points::CHECKPOINT, "skip"));
        assert_eq!(armed.unwrap(), "Success:");

        let duplicate = inject_fault(&registry, &InjectRequest::new(points::CHECKPOINT, "skip"));
        assert_eq!(
            duplicate.unwrap(),
            "Failure: could not insert fault injection, entry already exists"
        );

        let status = inject_fault(&registry, &InjectRequest::new(points::CHECKPOINT, "status"))
            .unwrap();
        assert!(status.starts_with("Success: fault name:'checkpoint'"));

        let reset = inject_fault(&registry, &InjectRequest::new(points::ALL, "reset"));
        assert_eq!(reset.unwrap(), "Success:");
        assert_eq!(registry.live_slots(), 0);
    }

    #[test]
    fn test_invalid_request_leaves_registry_untouched() {
        let registry = FaultRegistry::default();
        let result = inject_fault(
            &registry,
            &InjectRequest::new(points::CHECKPOINT, "sleep").extra(-1),
        );
        assert!(result.is_err());
        assert_eq!(registry.live_slots(), 0);
    }

    #[test]
    fn test_request_json_defaults() {
        let request: InjectRequest =
            serde_json::from_str(r#"{"name": "checkpoint", "type": "suspend"}"#).unwrap();
        assert_eq!(request, InjectRequest::new("checkpoint", "suspend"));
    }
}
