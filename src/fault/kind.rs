//! Closed vocabularies: fault kinds, control commands, states, DDL scopes

use std::fmt;

/// What a fault does to the segment that triggers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Sleep `extra_arg` seconds
    Sleep,
    /// Terminate the segment
    Fatal,
    /// Abort the segment without a core dump
    Panic,
    /// Raise a recoverable error in the segment
    Error,
    /// Spin (cancellable) until removed or one hour passes
    InfiniteLoop,
    /// Block (cancellable) until resumed or removed
    Suspend,
    /// Release signal for a suspended fault
    Resume,
    /// Log only; the call site decides what skipping means
    Skip,
    /// Crash with a segmentation fault, no core dump
    Segv,
    /// Raise the host's interrupt and query-cancel flags
    Interrupt,
    /// Raise the host's query-cancel flag
    FinishPending,
}

impl FaultKind {
    /// Every action kind
    pub const ALL: [FaultKind; 11] = [
        FaultKind::Sleep,
        FaultKind::Fatal,
        FaultKind::Panic,
        FaultKind::Error,
        FaultKind::InfiniteLoop,
        FaultKind::Suspend,
        FaultKind::Resume,
        FaultKind::Skip,
        FaultKind::Segv,
        FaultKind::Interrupt,
        FaultKind::FinishPending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Sleep => "sleep",
            FaultKind::Fatal => "fatal",
            FaultKind::Panic => "panic",
            FaultKind::Error => "error",
            FaultKind::InfiniteLoop => "infinite_loop",
            FaultKind::Suspend => "suspend",
            FaultKind::Resume => "resume",
            FaultKind::Skip => "skip",
            FaultKind::Segv => "segv",
            FaultKind::Interrupt => "interrupt",
            FaultKind::FinishPending => "finish_pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Kinds that terminate the triggering segment
    pub fn is_destructive(&self) -> bool {
        matches!(self, FaultKind::Fatal | FaultKind::Panic | FaultKind::Segv)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control command as named by the `type` argument of an injection request
///
/// Everything that is not a control command arms a new fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCommand {
    /// Arm a new fault of the given kind
    Arm(FaultKind),
    /// Remove one fault, or all of them
    Reset,
    /// Report registry contents
    Status,
    /// Block until the fault has triggered `extra_arg` times
    WaitUntilTriggered,
    /// Release a suspended fault
    Resume,
}

impl FaultCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCommand::Arm(kind) => kind.as_str(),
            FaultCommand::Reset => "reset",
            FaultCommand::Status => "status",
            FaultCommand::WaitUntilTriggered => "wait_until_triggered",
            FaultCommand::Resume => "resume",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reset" => Some(FaultCommand::Reset),
            "status" => Some(FaultCommand::Status),
            "wait_until_triggered" => Some(FaultCommand::WaitUntilTriggered),
            "resume" => Some(FaultCommand::Resume),
            other => FaultKind::parse(other).map(FaultCommand::Arm),
        }
    }

    /// Every recognized `type` string
    pub fn vocabulary() -> Vec<&'static str> {
        let mut names: Vec<_> = FaultKind::ALL
            .iter()
            .filter(|k| **k != FaultKind::Resume)
            .map(|k| k.as_str())
            .collect();
        names.extend(["reset", "status", "wait_until_triggered", "resume"]);
        names
    }
}

impl fmt::Display for FaultCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an armed fault
///
/// Advances Waiting -> Triggered -> {Completed | Failed}; never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultState {
    Waiting,
    Triggered,
    Completed,
    Failed,
}

impl FaultState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultState::Waiting => "waiting",
            FaultState::Triggered => "triggered",
            FaultState::Completed => "completed",
            FaultState::Failed => "failed",
        }
    }

    /// Completed or Failed; a terminal fault never fires again
    pub fn is_terminal(&self) -> bool {
        matches!(self, FaultState::Completed | FaultState::Failed)
    }
}

impl fmt::Display for FaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DDL statement context a fault is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DdlStatement {
    /// No DDL filter; matches every caller context
    NotSpecified,
    CreateDatabase,
    DropDatabase,
    CreateTable,
    DropTable,
    CreateIndex,
    AlterIndex,
    Reindex,
    DropIndex,
    CreateTablespace,
    DropTablespace,
    Truncate,
    Vacuum,
    Analyze,
}

impl DdlStatement {
    pub const ALL: [DdlStatement; 14] = [
        DdlStatement::NotSpecified,
        DdlStatement::CreateDatabase,
        DdlStatement::DropDatabase,
        DdlStatement::CreateTable,
        DdlStatement::DropTable,
        DdlStatement::CreateIndex,
        DdlStatement::AlterIndex,
        DdlStatement::Reindex,
        DdlStatement::DropIndex,
        DdlStatement::CreateTablespace,
        DdlStatement::DropTablespace,
        DdlStatement::Truncate,
        DdlStatement::Vacuum,
        DdlStatement::Analyze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DdlStatement::NotSpecified => "",
            DdlStatement::CreateDatabase => "create_database",
            DdlStatement::DropDatabase => "drop_database",
            DdlStatement::CreateTable => "create_table",
            DdlStatement::DropTable => "drop_table",
            DdlStatement::CreateIndex => "create_index",
            DdlStatement::AlterIndex => "alter_index",
            DdlStatement::Reindex => "reindex",
            DdlStatement::DropIndex => "drop_index",
            DdlStatement::CreateTablespace => "create_tablespace",
            DdlStatement::DropTablespace => "drop_tablespace",
            DdlStatement::Truncate => "truncate",
            DdlStatement::Vacuum => "vacuum",
            DdlStatement::Analyze => "analyze",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == s)
    }

    /// Whether a fault scoped to `self` fires for a caller in `caller` context
    pub fn admits(&self, caller: DdlStatement) -> bool {
        *self == DdlStatement::NotSpecified || *self == caller
    }
}

impl Default for DdlStatement {
    fn default() -> Self {
        DdlStatement::NotSpecified
    }
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kind_parse_matches_as_str() {
        for kind in FaultKind::ALL {
            assert_eq!(FaultKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FaultKind::parse("explode"), None);
        assert_eq!(FaultKind::parse("status"), None);
    }

    #[test]
    fn test_command_parse_routes_control_types() {
        assert_eq!(FaultCommand::parse("reset"), Some(FaultCommand::Reset));
        assert_eq!(FaultCommand::parse("status"), Some(FaultCommand::Status));
        assert_eq!(
            FaultCommand::parse("wait_until_triggered"),
            Some(FaultCommand::WaitUntilTriggered)
        );
        assert_eq!(FaultCommand::parse("resume"), Some(FaultCommand::Resume));
        assert_eq!(
            FaultCommand::parse("suspend"),
            Some(FaultCommand::Arm(FaultKind::Suspend))
        );
        assert_eq!(FaultCommand::parse(""), None);
    }

    #[test]
    fn test_command_vocabulary_has_every_type_once() {
        let vocabulary = FaultCommand::vocabulary();
        assert_eq!(vocabulary.len(), 14);
        for name in &vocabulary {
            assert!(FaultCommand::parse(name).is_some());
        }
    }

    #[test]
    fn test_destructive_kinds() {
        let destructive: Vec<_> = FaultKind::ALL
            .iter()
            .filter(|k| k.is_destructive())
            .collect();
        assert_eq!(
            destructive,
            vec![&FaultKind::Fatal, &FaultKind::Panic, &FaultKind::Segv]
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!FaultState::Waiting.is_terminal());
        assert!(!FaultState::Triggered.is_terminal());
        assert!(FaultState::Completed.is_terminal());
        assert!(FaultState::Failed.is_terminal());
    }

    #[test]
    fn test_unspecified_ddl_admits_everything() {
        for ddl in DdlStatement::ALL {
            assert!(DdlStatement::NotSpecified.admits(ddl));
        }
        assert!(DdlStatement::CreateTable.admits(DdlStatement::CreateTable));
        assert!(!DdlStatement::CreateTable.admits(DdlStatement::DropTable));
        assert!(!DdlStatement::CreateTable.admits(DdlStatement::NotSpecified));
    }

    #[test]
    fn test_ddl_parse() {
        assert_eq!(DdlStatement::parse(""), Some(DdlStatement::NotSpecified));
        assert_eq!(DdlStatement::parse("vacuum"), Some(DdlStatement::Vacuum));
        assert_eq!(DdlStatement::parse("create_view"), None);
    }
}
