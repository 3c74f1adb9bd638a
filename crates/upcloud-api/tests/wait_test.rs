// State polling tests over a scripted in-memory transport.
//
// Time is paused, so every `sleep` of the tokio clock completes instantly
// while `Instant::now()` still advances by the slept amount.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use tokio::time::Instant;

use upcloud_api::models::{ServerState, StorageState};
use upcloud_api::requests::{WaitForServerStateRequest, WaitForStorageStateRequest};
use upcloud_api::{Client, Error, PollConfig, Transport, TransportErrorPolicy};

const I: Duration = Duration::from_secs(5);
const UUID: &str = "0077fa3d-32db-4b09-9f5f-30d9e9afb565";

// ── Scripted transport ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Step {
    Server(&'static str),
    Storage(&'static str),
    Unavailable,
}

impl Step {
    fn respond(self) -> Result<Bytes, Error> {
        match self {
            Self::Server(state) => Ok(Bytes::from(format!(
                r#"{{"server": {{"uuid": "{UUID}", "state": "{state}"}}}}"#
            ))),
            Self::Storage(state) => Ok(Bytes::from(format!(
                r#"{{"storage": {{"uuid": "{UUID}", "state": "{state}"}}}}"#
            ))),
            Self::Unavailable => Err(Error::Api {
                status: 503,
                code: None,
                message: "Service unavailable".into(),
            }),
        }
    }
}

/// Replays `steps` in order, repeating the last one once exhausted.
struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl ScriptedTransport {
    fn new(steps: &[Step]) -> Self {
        Self {
            steps: Mutex::new(steps.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        _body: Option<Vec<u8>>,
    ) -> Result<Bytes, Error> {
        self.calls.lock().unwrap().push((method, path.to_owned()));
        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                steps[0]
            }
        };
        step.respond()
    }
}

fn client(steps: &[Step]) -> Client<ScriptedTransport> {
    Client::with_transport(ScriptedTransport::new(steps))
}

fn wait_server(
    desired: Option<ServerState>,
    undesired: Option<ServerState>,
    timeout: Duration,
) -> WaitForServerStateRequest {
    WaitForServerStateRequest {
        uuid: UUID.into(),
        desired_state: desired,
        undesired_state: undesired,
        timeout,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_reaches_desired_state() {
    let client = client(&[
        Step::Server("stopped"),
        Step::Server("stopped"),
        Step::Server("started"),
    ]);
    let timeout = I * 10;
    let start = Instant::now();

    let details = client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, timeout))
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert_eq!(details.state(), ServerState::Started);
    assert_eq!(client.transport().calls(), 3);
    assert!(elapsed >= I * 2, "{elapsed:?}");
    assert!(elapsed < timeout, "{elapsed:?}");

    let calls = client.transport().calls.lock().unwrap();
    assert!(
        calls
            .iter()
            .all(|(m, p)| *m == Method::GET && *p == format!("server/{UUID}"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_times_out_with_last_state() {
    let client = client(&[Step::Server("maintenance")]);
    let start = Instant::now();

    let result = client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, I * 5))
        .await;

    let elapsed = start.elapsed();
    match result {
        Err(Error::WaitTimeout {
            ref resource,
            ref target,
            ref last_state,
            timeout_secs,
        }) => {
            assert_eq!(resource, &format!("server {UUID}"));
            assert_eq!(target, "reach state started");
            assert_eq!(last_state.as_deref(), Some("maintenance"));
            assert_eq!(timeout_secs, 25);
        }
        other => panic!("expected WaitTimeout, got: {other:?}"),
    }
    assert!(elapsed >= I * 5, "{elapsed:?}");
    assert!(elapsed <= I * 6, "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_leaves_undesired_state() {
    let client = client(&[
        Step::Server("maintenance"),
        Step::Server("maintenance"),
        Step::Server("stopped"),
    ]);

    let details = client
        .wait_for_server_state(&wait_server(None, Some(ServerState::Maintenance), I * 10))
        .await
        .unwrap();

    assert_eq!(details.state(), ServerState::Stopped);
    assert_eq!(client.transport().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_already_in_desired_state_polls_once() {
    let client = client(&[Step::Server("started")]);
    let start = Instant::now();

    client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, I))
        .await
        .unwrap();

    assert_eq!(client.transport().calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_storage_comes_online() {
    let client = client(&[
        Step::Storage("maintenance"),
        Step::Storage("syncing"),
        Step::Storage("online"),
    ]);

    let details = client
        .wait_for_storage_state(&WaitForStorageStateRequest {
            uuid: UUID.into(),
            desired_state: Some(StorageState::Online),
            undesired_state: None,
            timeout: I * 10,
        })
        .await
        .unwrap();

    assert_eq!(details.state(), StorageState::Online);
    assert_eq!(client.transport().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_both_states_rejected_without_polling() {
    let client = client(&[Step::Server("started")]);

    let result = client
        .wait_for_server_state(&wait_server(
            Some(ServerState::Started),
            Some(ServerState::Maintenance),
            I,
        ))
        .await;

    assert!(
        matches!(result, Err(Error::InvalidWaitRequest(_))),
        "expected InvalidWaitRequest, got: {result:?}"
    );
    assert_eq!(client.transport().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_aborts_by_default() {
    let client = client(&[Step::Unavailable, Step::Server("started")]);

    let err = client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, I * 5))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 503, .. }), "{err:?}");
    assert_eq!(client.transport().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_retried_when_configured() {
    let client = client(&[
        Step::Unavailable,
        Step::Unavailable,
        Step::Server("started"),
    ])
    .with_poll_config(PollConfig {
        interval: I,
        on_transport_error: TransportErrorPolicy::Retry,
    });

    let details = client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, I * 5))
        .await
        .unwrap();

    assert_eq!(details.state(), ServerState::Started);
    assert_eq!(client.transport().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_keeps_timeout_bound() {
    let client = client(&[Step::Unavailable]).with_poll_config(PollConfig {
        interval: I,
        on_transport_error: TransportErrorPolicy::Retry,
    });

    let err = client
        .wait_for_server_state(&wait_server(Some(ServerState::Started), None, I * 2))
        .await
        .unwrap_err();

    match err {
        Error::WaitTimeout { last_state, .. } => assert_eq!(last_state, None),
        other => panic!("expected WaitTimeout, got: {other:?}"),
    }
    assert_eq!(client.transport().calls(), 3);
}
