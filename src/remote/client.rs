//! Blocking HTTP client for the registry hosted by `faultinjector serve`

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use super::errors::{RemoteError, RemoteResult};
use super::wire::{
    ArmedResponse, CompletedResponse, ControlResponse, ErrorResponse, TriggerRequest,
    TriggerResponse,
};
use crate::config::FaultInjectorConfig;
use crate::control::InjectRequest;
use crate::fault::{DdlStatement, FaultEntry, FaultKind};
use crate::observability::{log_event_with_fields, Event};
use crate::trigger::FaultSource;

/// Budget for a single call-site request
const SEGMENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack on top of the server's wait timeout for control commands
const CONTROL_REQUEST_SLACK: Duration = Duration::from_secs(30);

/// The control server's registry, seen from another process
///
/// Used as the `FaultSource` of worker segments, and by controllers that
/// drive the registry from outside the server process.
pub struct RemoteRegistry {
    base_url: String,
    client: Client,
    config: FaultInjectorConfig,
}

impl RemoteRegistry {
    /// Connect to `base_url` (e.g. `http://127.0.0.1:7878`) with default
    /// polling settings
    pub fn new(base_url: impl Into<String>) -> RemoteResult<Self> {
        Self::with_config(base_url, FaultInjectorConfig::default())
    }

    /// Connect with local poll interval and loop budgets from `config`
    pub fn with_config(
        base_url: impl Into<String>,
        config: FaultInjectorConfig,
    ) -> RemoteResult<Self> {
        let client = Client::builder().timeout(None::<Duration>).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Match and count one call on the server; the fired entry, if any
    pub fn trigger(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> RemoteResult<Option<FaultEntry>> {
        let request = TriggerRequest {
            name: name.to_string(),
            ddl: ddl.as_str().to_string(),
            database: database.to_string(),
            table: table.to_string(),
        };
        let response = self
            .client
            .post(self.url("/segments/trigger"))
            .timeout(SEGMENT_REQUEST_TIMEOUT)
            .json(&request)
            .send()?;
        let body: TriggerResponse = decode(response)?;

        match body.fired {
            None => Ok(None),
            Some(fired) => {
                let kind = fired.kind.clone();
                fired
                    .into_entry()
                    .map(Some)
                    .ok_or_else(|| RemoteError::Protocol(format!("unknown fault type '{}'", kind)))
            }
        }
    }

    /// Current kind of the fault `name`, `None` once removed
    pub fn fault_kind(&self, name: &str) -> RemoteResult<Option<FaultKind>> {
        let response = self
            .client
            .get(self.url(&format!("/faults/{}", name)))
            .timeout(SEGMENT_REQUEST_TIMEOUT)
            .send()?;
        let body: ArmedResponse = decode(response)?;

        match body.kind {
            None => Ok(None),
            Some(kind) => FaultKind::parse(&kind)
                .map(Some)
                .ok_or_else(|| RemoteError::Protocol(format!("unknown fault type '{}'", kind))),
        }
    }

    /// Completion poll, answered and cleaned up by the server
    pub fn is_completed(&self, name: &str) -> RemoteResult<bool> {
        let response = self
            .client
            .get(self.url(&format!("/faults/{}/completed", name)))
            .timeout(SEGMENT_REQUEST_TIMEOUT)
            .send()?;
        let body: CompletedResponse = decode(response)?;
        Ok(body.completed)
    }

    /// Run a textual control command on the server.
    ///
    /// Waits may block for the server's wait timeout, so the request budget
    /// follows the local `wait_timeout_secs`.
    pub fn inject(&self, request: &InjectRequest) -> RemoteResult<String> {
        let response = self
            .client
            .post(self.url("/faults/inject"))
            .timeout(self.config.wait_timeout() + CONTROL_REQUEST_SLACK)
            .json(request)
            .send()?;
        let body: ControlResponse = decode(response)?;
        Ok(body.result)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json()?);
    }

    match response.json::<ErrorResponse>() {
        Ok(body) => Err(RemoteError::Rejected {
            status: status.as_u16(),
            code: body.code,
            error: body.error,
        }),
        Err(_) => Err(RemoteError::Protocol(format!("status {}", status))),
    }
}

/// An unreachable registry counts as "nothing armed": the segment proceeds.
impl FaultSource for RemoteRegistry {
    fn config(&self) -> &FaultInjectorConfig {
        &self.config
    }

    fn is_probably_empty(&self) -> bool {
        false
    }

    fn match_and_advance(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> Option<FaultEntry> {
        self.trigger(name, ddl, database, table)
            .unwrap_or_else(|err| {
                log_unavailable(name, &err);
                None
            })
    }

    fn armed_kind(&self, name: &str) -> Option<FaultKind> {
        self.fault_kind(name).unwrap_or_else(|err| {
            log_unavailable(name, &err);
            None
        })
    }
}

fn log_unavailable(name: &str, err: &RemoteError) {
    log_event_with_fields(
        Event::RemoteRegistryUnavailable,
        &[
            ("code", err.code()),
            ("error", &err.to_string()),
            ("fault_name", name),
        ],
    );
}
