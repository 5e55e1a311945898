//! Shared harness: serves the API on an ephemeral port.

use std::sync::Arc;

use mockable::DefaultClock;
use reqwest::Url;
use taskboard::api::{StaticTokenAuthenticator, router};
use taskboard::task::adapters::memory::InMemoryTaskRepository;
use taskboard::task::domain::OwnerId;
use taskboard::task::services::TaskAccessService;
use tokio::net::TcpListener;

/// Bearer token resolving to `alice`.
pub const ALICE_TOKEN: &str = "alice-token";
/// Bearer token resolving to `bob`.
pub const BOB_TOKEN: &str = "bob-token";

/// Starts the API over an empty in-memory store and returns its root URL.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_server() -> Url {
    let tokens = [(ALICE_TOKEN, "alice"), (BOB_TOKEN, "bob")]
        .into_iter()
        .map(|(token, user)| (token.to_owned(), OwnerId::new(user).expect("valid owner")));
    let tasks = TaskAccessService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    );
    let app = router(tasks, Arc::new(StaticTokenAuthenticator::new(tokens)), None);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port available");
    let addr = listener.local_addr().expect("bound address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    Url::parse(&format!("http://{addr}/")).expect("valid server URL")
}
