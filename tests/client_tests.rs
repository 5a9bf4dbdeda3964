mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::{Behavior, StubProvider, test_config};
use support_relay::client::{ChatClient, ClientError, DEFAULT_TIMEOUT, ProbeOutcome};
use support_relay::server;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct RunningRelay {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningRelay {
    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn spawn_relay(provider: Arc<StubProvider>) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server::serve(listener, test_config(&[]), provider, async {
        rx.await.ok();
    }));

    RunningRelay { addr, shutdown, handle }
}

#[tokio::test]
async fn submit_returns_reply() {
    let relay = spawn_relay(Arc::new(StubProvider::replying("Hi there"))).await;
    let client = ChatClient::new(relay.url(), DEFAULT_TIMEOUT).unwrap();

    let reply = client.submit("Hello").await.unwrap();
    assert_eq!(reply.message, "Hi there");

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn server_errors_surface_relay_message() {
    let relay = spawn_relay(Arc::new(StubProvider::new(Behavior::Unauthorized))).await;
    let client = ChatClient::new(relay.url(), DEFAULT_TIMEOUT).unwrap();

    match client.submit("Hello").await.unwrap_err() {
        ClientError::Server { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn slow_relay_times_out() {
    let provider = Arc::new(StubProvider::new(Behavior::Slow(Duration::from_secs(5), "late".into())));
    let relay = spawn_relay(provider).await;
    let client = ChatClient::new(relay.url(), Duration::from_millis(100)).unwrap();

    let err = client.submit("Hello").await.unwrap_err();
    assert!(matches!(err, ClientError::TimedOut(_)), "got {err:?}");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn closed_port_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatClient::new(format!("http://{addr}"), DEFAULT_TIMEOUT).unwrap();
    let err = client.submit("Hello").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");

    let report = client.self_test().await;
    assert!(matches!(report.outcome, ProbeOutcome::Unreachable(_)));
}

#[tokio::test]
async fn self_test_classifies_outcomes() {
    let relay = spawn_relay(Arc::new(StubProvider::replying("pong"))).await;
    let client = ChatClient::new(relay.url(), DEFAULT_TIMEOUT).unwrap();
    let report = client.self_test().await;
    assert!(report.is_healthy(), "{report}");

    let relay = spawn_relay(Arc::new(StubProvider::new(Behavior::Fail(503, "overloaded".into())))).await;
    let client = ChatClient::new(relay.url(), DEFAULT_TIMEOUT).unwrap();
    let report = client.self_test().await;
    match &report.outcome {
        ProbeOutcome::RelayError { status, message } => {
            assert_eq!(*status, 500);
            assert!(message.contains("overloaded"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(report.to_string().contains("Suggested steps"));
}

#[tokio::test]
async fn shutdown_drains_in_flight_request() {
    let provider = Arc::new(StubProvider::new(Behavior::Slow(
        Duration::from_millis(300),
        "finished".into(),
    )));
    let relay = spawn_relay(provider).await;
    let client = ChatClient::new(relay.url(), DEFAULT_TIMEOUT).unwrap();

    let in_flight = tokio::spawn(async move { client.submit("Hello").await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    relay.shutdown.send(()).unwrap();

    let reply = in_flight.await.unwrap().unwrap();
    assert_eq!(reply.message, "finished");

    relay.handle.await.unwrap().unwrap();

    // No longer accepting.
    let client = ChatClient::new(format!("http://{}", relay.addr), Duration::from_secs(2)).unwrap();
    assert!(client.health().await.is_err());
}
