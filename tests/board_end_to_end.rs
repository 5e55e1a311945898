//! End-to-end board scenarios: the board controller driving the HTTP client
//! against a live server.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eyre::ensure;
use reqwest::Url;
use rstest::rstest;
use support::{ALICE_TOKEN, BOB_TOKEN, spawn_server};
use taskboard::board::{
    BoardController, DragEvent, DropTarget, HttpTaskApi, TaskApi, TaskApiError, TaskApiResult,
};
use taskboard::config::ClientConfig;
use taskboard::task::domain::{Task, TaskCandidate, TaskChanges, TaskId, TaskStatus};
use tokio::net::TcpListener;

fn http_api(base: &Url, token: &str) -> HttpTaskApi {
    HttpTaskApi::new(&ClientConfig::new(base.clone(), token.to_owned())).expect("valid client")
}

/// Records update payloads before forwarding them to the wrapped client.
struct RecordingApi {
    inner: HttpTaskApi,
    updates: Mutex<Vec<(TaskId, TaskChanges)>>,
}

impl RecordingApi {
    fn updates(&self) -> Vec<(TaskId, TaskChanges)> {
        self.updates.lock().expect("updates lock").clone()
    }
}

#[async_trait]
impl TaskApi for RecordingApi {
    async fn list(&self, status: Option<TaskStatus>) -> TaskApiResult<Vec<Task>> {
        self.inner.list(status).await
    }

    async fn create(&self, candidate: &TaskCandidate) -> TaskApiResult<Task> {
        self.inner.create(candidate).await
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskApiResult<Task> {
        self.updates
            .lock()
            .expect("updates lock")
            .push((id, changes.clone()));
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: TaskId) -> TaskApiResult<()> {
        self.inner.delete(id).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dragging_a_card_to_completed_moves_it_on_the_server() -> eyre::Result<()> {
    let base = spawn_server().await;
    let api = Arc::new(RecordingApi {
        inner: http_api(&base, ALICE_TOKEN),
        updates: Mutex::new(Vec::new()),
    });
    let board = BoardController::new(Arc::clone(&api));
    board.mount().await?;
    board.create(TaskCandidate::new("Draft agenda")).await?;
    let id = board
        .column(TaskStatus::Pending)
        .first()
        .map(Task::id)
        .ok_or_else(|| eyre::eyre!("created task missing from pending column"))?;

    board.drag(DragEvent::PickUp(id)).await?;
    board
        .drag(DragEvent::Hover(Some(DropTarget::Column(TaskStatus::Completed))))
        .await?;
    board.drag(DragEvent::Release).await?;

    ensure!(api.updates() == vec![(id, TaskChanges::status(TaskStatus::Completed))]);
    ensure!(board.column(TaskStatus::Pending).is_empty());
    let completed: Vec<TaskId> = board
        .column(TaskStatus::Completed)
        .iter()
        .map(Task::id)
        .collect();
    ensure!(completed == vec![id]);
    let on_server = api.inner.list(Some(TaskStatus::Completed)).await?;
    ensure!(on_server.iter().map(Task::id).eq([id]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_only_sees_its_owner_tasks() -> eyre::Result<()> {
    let base = spawn_server().await;
    let alice = http_api(&base, ALICE_TOKEN);
    let bob_board = BoardController::new(Arc::new(http_api(&base, BOB_TOKEN)));
    let private = alice.create(&TaskCandidate::new("Private")).await?;

    bob_board.mount().await?;
    let outcome = bob_board.delete(private.id()).await;

    ensure!(bob_board.tasks().is_empty());
    ensure!(matches!(
        outcome.map_err(|err| err.source),
        Err(TaskApiError::Unauthorized(_))
    ));
    ensure!(bob_board.error().as_deref() == Some("Failed to delete task"));
    ensure!(alice.list(None).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn client_surfaces_server_validation_errors() -> eyre::Result<()> {
    let base = spawn_server().await;
    let api = http_api(&base, ALICE_TOKEN);

    let result = api
        .create(&TaskCandidate::new("Ship").with_status("archived"))
        .await;

    ensure!(matches!(result, Err(TaskApiError::Validation(_))));
    ensure!(api.list(None).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hung_request_becomes_a_visible_error() -> eyre::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    let mut config = ClientConfig::new(
        Url::parse(&format!("http://{addr}/"))?,
        ALICE_TOKEN.to_owned(),
    );
    config.request_timeout = Duration::from_millis(200);
    let board = BoardController::new(Arc::new(HttpTaskApi::new(&config)?));

    let outcome = board.mount().await;

    ensure!(matches!(
        outcome.map_err(|err| err.source),
        Err(TaskApiError::Transport(_))
    ));
    ensure!(board.error().as_deref() == Some("Failed to load tasks"));
    ensure!(!board.is_loading());
    Ok(())
}
