//! Built-in fault point names
//!
//! A fault point is a named call site instrumented with
//! `SegmentContext::try_trigger`. Controllers may only arm names from this
//! vocabulary (plus any `extra_fault_names` from configuration).
//!
//! ```ignore
//! use faultinjector::fault::points;
//!
//! ctx.try_trigger(points::CHECKPOINT, DdlStatement::NotSpecified, "", "")?;
//! ```

/// Special identifier addressing every armed fault (reset, status)
pub const ALL: &str = "all";

// Checkpoint and WAL
pub const CHECKPOINT: &str = "checkpoint";
pub const CHECKPOINT_AFTER_REDO_CALCULATED: &str = "checkpoint_after_redo_calculated";
pub const CHECKPOINT_CONTROL_FILE_UPDATED: &str = "checkpoint_control_file_updated";
pub const WAL_BEFORE_INSERT: &str = "wal_before_insert";
pub const WAL_AFTER_FLUSH: &str = "wal_after_flush";
pub const WAL_SENDER_LOOP: &str = "wal_sender_loop";
pub const WAL_RECEIVER_BEFORE_CONNECT: &str = "wal_receiver_before_connect";

// Transactions
pub const TRANSACTION_ABORT_AFTER_DISTRIBUTED_PREPARED: &str =
    "transaction_abort_after_distributed_prepared";
pub const DTM_BROADCAST_PREPARE: &str = "dtm_broadcast_prepare";
pub const DTM_BROADCAST_COMMIT_PREPARED: &str = "dtm_broadcast_commit_prepared";
pub const START_PREPARE: &str = "start_prepare";
pub const FINISH_PREPARED_AFTER_RECORD_COMMIT_PREPARED: &str =
    "finish_prepared_after_record_commit_prepared";

// Storage
pub const COMPACTION_BEFORE_SEGMENTFILE_DROP: &str = "compaction_before_segmentfile_drop";
pub const APPENDONLY_INSERT: &str = "appendonly_insert";
pub const BEFORE_PAGE_WRITE: &str = "before_page_write";
pub const FREEPAGEMAP_BEFORE_EXTEND: &str = "freepagemap_before_extend";

// Query execution
pub const EXEC_MPP_QUERY_START: &str = "exec_mpp_query_start";
pub const EXECUTOR_BEFORE_SCAN: &str = "executor_before_scan";
pub const QUERY_CANCEL_DURING_EXECUTION: &str = "query_cancel_during_execution";

// Maintenance
pub const VACUUM_UPDATE_DAT_FROZEN_XID: &str = "vacuum_update_dat_frozen_xid";
pub const AUTO_VAC_WORKER_BEFORE_DO_AUTOVACUUM: &str = "auto_vac_worker_before_do_autovacuum";
pub const VACUUM_RELATION_OPEN: &str = "vacuum_relation_open";

// Cluster management
pub const FTS_PROBE: &str = "fts_probe";
pub const SEGMENT_PROBE_RESPONSE: &str = "segment_probe_response";
pub const PROMOTE_MIRROR: &str = "promote_mirror";

/// Fault names an autovacuum worker is still allowed to trigger
pub fn autovacuum_worker_allowed() -> &'static [&'static str] {
    &[VACUUM_UPDATE_DAT_FROZEN_XID, AUTO_VAC_WORKER_BEFORE_DO_AUTOVACUUM]
}

/// Get all built-in fault point names (including `all`)
pub fn all() -> &'static [&'static str] {
    &[
        ALL,
        CHECKPOINT,
        CHECKPOINT_AFTER_REDO_CALCULATED,
        CHECKPOINT_CONTROL_FILE_UPDATED,
        WAL_BEFORE_INSERT,
        WAL_AFTER_FLUSH,
        WAL_SENDER_LOOP,
        WAL_RECEIVER_BEFORE_CONNECT,
        TRANSACTION_ABORT_AFTER_DISTRIBUTED_PREPARED,
        DTM_BROADCAST_PREPARE,
        DTM_BROADCAST_COMMIT_PREPARED,
        START_PREPARE,
        FINISH_PREPARED_AFTER_RECORD_COMMIT_PREPARED,
        COMPACTION_BEFORE_SEGMENTFILE_DROP,
        APPENDONLY_INSERT,
        BEFORE_PAGE_WRITE,
        FREEPAGEMAP_BEFORE_EXTEND,
        EXEC_MPP_QUERY_START,
        EXECUTOR_BEFORE_SCAN,
        QUERY_CANCEL_DURING_EXECUTION,
        VACUUM_UPDATE_DAT_FROZEN_XID,
        AUTO_VAC_WORKER_BEFORE_DO_AUTOVACUUM,
        VACUUM_RELATION_OPEN,
        FTS_PROBE,
        SEGMENT_PROBE_RESPONSE,
        PROMOTE_MIRROR,
    ]
}

/// True if `name` has the shape of a fault point name
pub fn is_well_formed(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= super::entry::FAULT_NAME_MAX_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
