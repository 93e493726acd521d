//! Remote Segment Tests
//!
//! Segments in another thread or process reach the registry hosted by the
//! control server through `RemoteRegistry`. The server matches and counts;
//! the action runs in the segment, so destructive faults end the worker and
//! leave the controller running.

use std::process::Command;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use faultinjector::config::FaultInjectorConfig;
use faultinjector::control::InjectRequest;
use faultinjector::fault::{points, DdlStatement, FaultKind, FaultState};
use faultinjector::http_server::HttpServer;
use faultinjector::registry::FaultRegistry;
use faultinjector::remote::{RemoteError, RemoteRegistry};
use faultinjector::trigger::{ProcessRole, SegmentContext, TriggerError, TriggerResult};

/// Set in the re-executed test binary that plays the worker process
const WORKER_REGISTRY_URL: &str = "FAULTINJECTOR_TEST_REGISTRY_URL";

fn fast_config() -> FaultInjectorConfig {
    FaultInjectorConfig {
        poll_interval_ms: 10,
        ..Default::default()
    }
}

/// A control server on an ephemeral port, serving from its own runtime
struct ControlServer {
    registry: Arc<FaultRegistry>,
    url: String,
}

impl ControlServer {
    fn start() -> Self {
        let registry = Arc::new(FaultRegistry::new(fast_config()));
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let server = HttpServer::new(registry.clone());
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                server.serve_on(listener).await.unwrap();
            });
        });

        Self { registry, url }
    }

    fn remote(&self) -> RemoteRegistry {
        RemoteRegistry::with_config(&self.url, fast_config()).unwrap()
    }

    fn segment(&self) -> SegmentContext<RemoteRegistry> {
        SegmentContext::new(Arc::new(self.remote()), ProcessRole::Backend)
    }

    fn inject(&self, request: InjectRequest) -> String {
        self.remote().inject(&request).unwrap()
    }
}

fn fire(ctx: &SegmentContext<RemoteRegistry>, name: &str) -> TriggerResult<Option<FaultKind>> {
    ctx.try_trigger(name, DdlStatement::NotSpecified, "", "")
}

fn spawn_segment(
    ctx: SegmentContext<RemoteRegistry>,
    name: &'static str,
) -> JoinHandle<TriggerResult<Option<FaultKind>>> {
    thread::spawn(move || fire(&ctx, name))
}

// =============================================================================
// REMOTE TRIGGERING
// =============================================================================

/// Test: The server counts remote calls against the occurrence window.
#[test]
fn test_remote_window() {
    let server = ControlServer::start();
    assert_eq!(
        server.inject(InjectRequest::new(points::CHECKPOINT, "skip").occurrences(2, 3)),
        "Success:"
    );

    let ctx = server.segment();
    assert_eq!(fire(&ctx, points::CHECKPOINT), Ok(None));
    assert_eq!(fire(&ctx, points::CHECKPOINT), Ok(Some(FaultKind::Skip)));
    assert_eq!(fire(&ctx, points::CHECKPOINT), Ok(Some(FaultKind::Skip)));
    assert_eq!(fire(&ctx, points::CHECKPOINT), Ok(None));

    let entry = server.registry.snapshot(points::CHECKPOINT).unwrap();
    assert_eq!(entry.times_triggered, 3);
    assert_eq!(entry.state, FaultState::Completed);
}

/// Test: Scope filters are applied by the server.
#[test]
fn test_remote_scope() {
    let server = ControlServer::start();
    server.inject(
        InjectRequest::new(points::APPENDONLY_INSERT, "error")
            .ddl("truncate")
            .database("regression"),
    );

    let ctx = server.segment();
    let miss = ctx.try_trigger(
        points::APPENDONLY_INSERT,
        DdlStatement::NotSpecified,
        "postgres",
        "",
    );
    assert_eq!(miss, Ok(None));

    let hit = ctx.try_trigger(
        points::APPENDONLY_INSERT,
        DdlStatement::Truncate,
        "regression",
        "",
    );
    assert!(matches!(hit, Err(TriggerError::Injected { .. })));
}

/// Test: A remote segment with nothing armed proceeds.
#[test]
fn test_remote_nothing_armed() {
    let server = ControlServer::start();
    assert_eq!(fire(&server.segment(), points::CHECKPOINT), Ok(None));
    assert_eq!(server.registry.live_slots(), 0);
}

/// Test: Control errors come back with the server's status and code.
#[test]
fn test_remote_control_error() {
    let server = ControlServer::start();
    let err = server
        .remote()
        .inject(&InjectRequest::new(points::CHECKPOINT, "wait_until_triggered").extra(1))
        .unwrap_err();

    match err {
        RemoteError::Rejected { status, code, .. } => {
            assert_eq!(status, 404);
            assert_eq!(code, "FI_FAULT_NOT_SET");
        }
        other => panic!("unexpected error: {}", other),
    }
}

// =============================================================================
// REMOTE BLOCKING FAULTS
// =============================================================================

/// Test: A remote segment suspends until the controller resumes it.
#[test]
fn test_remote_suspend_then_resume() {
    let server = ControlServer::start();
    server.inject(InjectRequest::new(points::DTM_BROADCAST_PREPARE, "suspend"));

    let worker = spawn_segment(server.segment(), points::DTM_BROADCAST_PREPARE);

    assert_eq!(
        server.inject(InjectRequest::new(points::DTM_BROADCAST_PREPARE, "wait_until_triggered").extra(1)),
        "Success:"
    );
    assert!(!worker.is_finished());

    assert_eq!(
        server.inject(InjectRequest::new(points::DTM_BROADCAST_PREPARE, "resume")),
        "Success:"
    );
    assert_eq!(worker.join().unwrap(), Ok(Some(FaultKind::Suspend)));

    let remote = server.remote();
    assert!(remote.is_completed(points::DTM_BROADCAST_PREPARE).unwrap());
    assert!(!server.registry.contains(points::DTM_BROADCAST_PREPARE));
}

/// Test: A remote infinite loop ends once the fault is reset.
#[test]
fn test_remote_infinite_loop_reset() {
    let server = ControlServer::start();
    server.inject(InjectRequest::new(points::WAL_SENDER_LOOP, "infinite_loop"));

    let worker = spawn_segment(server.segment(), points::WAL_SENDER_LOOP);

    server.inject(InjectRequest::new(points::WAL_SENDER_LOOP, "wait_until_triggered").extra(1));
    assert_eq!(
        server.inject(InjectRequest::new(points::WAL_SENDER_LOOP, "reset")),
        "Success:"
    );
    assert_eq!(worker.join().unwrap(), Ok(Some(FaultKind::InfiniteLoop)));
}

// =============================================================================
// WORKER PROCESSES
// =============================================================================

/// Test: Worker side of the process tests; idle unless re-executed by them.
#[test]
fn test_remote_worker_process() {
    let Ok(url) = std::env::var(WORKER_REGISTRY_URL) else {
        return;
    };

    let remote = RemoteRegistry::with_config(url, fast_config()).unwrap();
    let ctx = SegmentContext::new(Arc::new(remote), ProcessRole::Backend);
    let _ = fire(&ctx, points::CHECKPOINT);

    // Reached only when no destructive fault fired
    std::process::exit(2);
}

fn run_worker_process(server: &ControlServer) -> std::process::ExitStatus {
    Command::new(std::env::current_exe().unwrap())
        .args(["--exact", "test_remote_worker_process", "--nocapture"])
        .env(WORKER_REGISTRY_URL, &server.url)
        .status()
        .unwrap()
}

/// Test: A fatal fault ends the worker process and not the controller.
#[test]
fn test_fatal_ends_worker_process_only() {
    let server = ControlServer::start();
    assert_eq!(
        server.inject(InjectRequest::new(points::CHECKPOINT, "fatal")),
        "Success:"
    );

    let status = run_worker_process(&server);
    assert_eq!(status.code(), Some(1));

    // Controller still serving, fault recorded as fired
    let entry = server.registry.snapshot(points::CHECKPOINT).unwrap();
    assert_eq!(entry.times_triggered, 1);
    assert_eq!(entry.state, FaultState::Completed);

    assert!(server.remote().is_completed(points::CHECKPOINT).unwrap());
    assert!(!server.registry.contains(points::CHECKPOINT));
}

/// Test: A panic fault aborts the worker process and not the controller.
#[cfg(unix)]
#[test]
fn test_panic_aborts_worker_process_only() {
    let server = ControlServer::start();
    server.inject(InjectRequest::new(points::CHECKPOINT, "panic"));

    let status = run_worker_process(&server);
    assert!(!status.success());
    assert_ne!(status.code(), Some(2));

    let status_report = server.inject(InjectRequest::new(points::CHECKPOINT, "status"));
    assert!(status_report.contains("num times hit:'1'"), "{}", status_report);
}

/// Test: With nothing armed the worker process runs past the call site.
#[test]
fn test_worker_process_proceeds_when_unarmed() {
    let server = ControlServer::start();
    let status = run_worker_process(&server);
    assert_eq!(status.code(), Some(2));
}
