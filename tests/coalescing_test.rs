//! Coalescing and failure semantics with a scripted in-process transport.
//!
//! A semaphore gate holds the network call open so the tests control
//! exactly when it settles.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use marquee::{CatalogClient, CatalogError, Marquee, RawResponse, Result, TimeWindow, Transport};
use reqwest::Url;
use serde_json::json;
use tokio::sync::Semaphore;

// ============================================================================
// Mock transport
// ============================================================================

struct State {
    calls: AtomicU32,
    gate: Semaphore,
    urls: Mutex<Vec<Url>>,
    reply: Mutex<Result<RawResponse>>,
}

#[derive(Clone)]
struct ScriptedTransport {
    state: Arc<State>,
}

impl ScriptedTransport {
    /// Calls block until [`release`](Self::release) is called.
    fn gated(reply: Result<RawResponse>) -> Self {
        Self {
            state: Arc::new(State {
                calls: AtomicU32::new(0),
                gate: Semaphore::new(0),
                urls: Mutex::new(Vec::new()),
                reply: Mutex::new(reply),
            }),
        }
    }

    /// Calls settle immediately.
    fn open(reply: Result<RawResponse>) -> Self {
        let transport = Self::gated(reply);
        transport.state.gate.add_permits(Semaphore::MAX_PERMITS / 2);
        transport
    }

    fn release(&self, n: usize) {
        self.state.gate.add_permits(n);
    }

    fn calls(&self) -> u32 {
        self.state.calls.load(Ordering::SeqCst)
    }

    fn set_reply(&self, reply: Result<RawResponse>) {
        *self.state.reply.lock().unwrap() = reply;
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.urls.lock().unwrap().push(url.clone());
        self.state.gate.acquire().await.unwrap().forget();
        self.state.reply.lock().unwrap().clone()
    }
}

fn ok_body(body: serde_json::Value) -> Result<RawResponse> {
    Ok(RawResponse::new(200, serde_json::to_vec(&body).unwrap()))
}

fn client_with(transport: &ScriptedTransport) -> CatalogClient {
    Marquee::builder()
        .api_key("k")
        .transport(transport.clone())
        .build()
        .unwrap()
}

async fn wait_for_pending(client: &CatalogClient, n: usize) {
    while client.pending_calls() < n {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn many_concurrent_callers_one_network_call() {
    let transport = ScriptedTransport::gated(ok_body(json!({"results": [{"id": 1}]})));
    let client = client_with(&transport);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.popular_movies(1).await })
        })
        .collect();

    wait_for_pending(&client, 1).await;
    // Let every spawned caller reach the registry before settling.
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    transport.release(1);

    for handle in handles {
        assert_eq!(
            handle.await.unwrap().unwrap(),
            json!({"results": [{"id": 1}]})
        );
    }
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn failure_is_observed_by_every_waiter_and_not_cached() {
    let transport = ScriptedTransport::gated(Err(CatalogError::Transport(
        "error sending request: connection refused".into(),
    )));
    let client = client_with(&transport);

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.trending(TimeWindow::Day, 1).await }
    });
    wait_for_pending(&client, 1).await;
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.trending(TimeWindow::Day, 1).await }
    });
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    transport.release(1);

    let a = first.await.unwrap().unwrap_err();
    let b = second.await.unwrap().unwrap_err();
    assert_eq!(a.to_string(), "error sending request: connection refused");
    assert_eq!(a, b);
    assert_eq!(transport.calls(), 1);

    // Immediately retryable: the next call goes back to the network.
    transport.set_reply(ok_body(json!({"results": []})));
    transport.release(1);
    assert!(client.trending(TimeWindow::Day, 1).await.is_ok());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn transport_message_passes_through_unmodified() {
    let message = "dns error: failed to lookup address information";
    let transport = ScriptedTransport::open(Err(CatalogError::Transport(message.into())));
    let client = client_with(&transport);

    let err = client.movie_genres().await.unwrap_err();
    assert_eq!(err.to_string(), message);
}

#[tokio::test]
async fn clear_during_flight_still_populates_cache() {
    let transport = ScriptedTransport::gated(ok_body(json!({"id": 550})));
    let client = client_with(&transport);

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.movie_details(550).await }
    });
    wait_for_pending(&client, 1).await;

    client.clear_cache();
    transport.release(1);
    assert_eq!(call.await.unwrap().unwrap(), json!({"id": 550}));

    // Served from the cache written by the in-flight call.
    assert_eq!(client.movie_details(550).await.unwrap(), json!({"id": 550}));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn call_runs_to_completion_when_caller_gives_up() {
    let transport = ScriptedTransport::gated(ok_body(json!({"genres": []})));
    let client = client_with(&transport);

    let caller = tokio::spawn({
        let client = client.clone();
        async move { client.tv_genres().await }
    });
    wait_for_pending(&client, 1).await;
    caller.abort();

    transport.release(1);
    while client.pending_calls() > 0 {
        tokio::task::yield_now().await;
    }

    assert!(client.tv_genres().await.is_ok());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn language_is_sent_with_every_request() {
    let transport = ScriptedTransport::open(ok_body(json!({"genres": []})));
    let english = client_with(&transport);
    let german = Marquee::builder()
        .api_key("k")
        .language("de-DE")
        .transport(transport.clone())
        .build()
        .unwrap();

    english.movie_genres().await.unwrap();
    german.movie_genres().await.unwrap();

    let urls = transport.state.urls.lock().unwrap().clone();
    assert_eq!(urls.len(), 2);
    assert!(urls[1].as_str().contains("language=de-DE"));
}

#[tokio::test]
async fn fresh_pages_stay_cached_after_many_writes() {
    let transport = ScriptedTransport::open(ok_body(json!({"results": []})));
    let client = client_with(&transport);

    for _ in 0..5 {
        for page in 1..=10 {
            client.popular_movies(page).await.unwrap();
        }
    }
    for page in 11..=40 {
        client.popular_movies(page).await.unwrap();
        client.popular_movies(page).await.unwrap();
    }

    assert_eq!(transport.calls(), 40);
    assert_eq!(client.cached_entries(), 40);
}
