//! Fault entry: one armed fault in the registry

use std::fmt;

use super::kind::{DdlStatement, FaultKind, FaultState};

/// Longest fault name, in bytes
pub const FAULT_NAME_MAX_LENGTH: usize = 255;

/// Database and table filters keep at most `NAME_DATA_LEN - 1` bytes
pub const NAME_DATA_LEN: usize = 64;

/// Wire value for an unbounded trigger window
pub const INFINITE_END_OCCURRENCE: i32 = -1;

/// Truncate a database or table name the same way on arming and triggering.
pub fn truncate_identifier(name: &str) -> &str {
    let max = NAME_DATA_LEN - 1;
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Last occurrence (inclusive) at which a fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOccurrence {
    At(u32),
    Infinite,
}

impl EndOccurrence {
    /// Interpret the wire value; -1 means infinite
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            INFINITE_END_OCCURRENCE => Some(EndOccurrence::Infinite),
            n if n >= 1 => Some(EndOccurrence::At(n as u32)),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            EndOccurrence::At(n) => *n as i32,
            EndOccurrence::Infinite => INFINITE_END_OCCURRENCE,
        }
    }

    fn reached_by(&self, count: u32) -> bool {
        match self {
            EndOccurrence::At(end) => count >= *end,
            EndOccurrence::Infinite => false,
        }
    }
}

/// An armed fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultEntry {
    pub name: String,
    pub kind: FaultKind,
    pub ddl: DdlStatement,
    pub database_name: String,
    pub table_name: String,
    pub start_occurrence: u32,
    pub end_occurrence: EndOccurrence,
    pub extra_arg: i32,
    pub times_triggered: u32,
    pub state: FaultState,
}

impl FaultEntry {
    /// A fault that fires once, on the first matching call, in any context
    pub fn new(name: impl Into<String>, kind: FaultKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ddl: DdlStatement::NotSpecified,
            database_name: String::new(),
            table_name: String::new(),
            start_occurrence: 1,
            end_occurrence: EndOccurrence::At(1),
            extra_arg: 0,
            times_triggered: 0,
            state: FaultState::Waiting,
        }
    }

    pub fn with_ddl(mut self, ddl: DdlStatement) -> Self {
        self.ddl = ddl;
        self
    }

    pub fn with_database(mut self, database: &str) -> Self {
        self.database_name = truncate_identifier(database).to_string();
        self
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table_name = truncate_identifier(table).to_string();
        self
    }

    pub fn with_occurrences(mut self, start: u32, end: EndOccurrence) -> Self {
        self.start_occurrence = start;
        self.end_occurrence = end;
        self
    }

    pub fn with_extra_arg(mut self, extra_arg: i32) -> Self {
        self.extra_arg = extra_arg;
        self
    }

    /// Whether a call from the given scope addresses this fault
    pub fn matches_scope(&self, ddl: DdlStatement, database: &str, table: &str) -> bool {
        self.ddl.admits(ddl)
            && self.database_name == truncate_identifier(database)
            && self.table_name == truncate_identifier(table)
    }

    /// Count one matching call and advance the state machine.
    ///
    /// Returns true if the fault fires on this call. Terminal entries are
    /// left untouched.
    pub fn record_match(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.times_triggered = self.times_triggered.saturating_add(1);
        if self.times_triggered < self.start_occurrence {
            return false;
        }

        self.state = FaultState::Triggered;
        if self.end_occurrence.reached_by(self.times_triggered) {
            self.state = FaultState::Completed;
        }
        true
    }

    /// Reset runtime fields for a fresh insert
    pub(crate) fn armed(mut self) -> Self {
        self.times_triggered = 0;
        self.state = FaultState::Waiting;
        self
    }
}

impl fmt::Display for FaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fault name:'{}' fault type:'{}' ddl statement:'{}' database name:'{}' \
             table name:'{}' start occurrence:'{}' end occurrence:'{}' extra arg:'{}' \
             fault injection state:'{}' num times hit:'{}'",
            self.name,
            self.kind,
            self.ddl,
            self.database_name,
            self.table_name,
            self.start_occurrence,
            self.end_occurrence.as_raw(),
            self.extra_arg,
            self.state,
            self.times_triggered,
        )
    }
}
