//! Unit tests for the board client.


use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use mockable::DefaultClock;
use tokio::sync::{Notify, oneshot};

use super::client::{TaskApi, TaskApiError, TaskApiResult};
use crate::task::domain::{OwnerId, Task, TaskCandidate, TaskChanges, TaskId, TaskStatus};

mockall::mock! {
    pub(super) Tasks {}

    #[async_trait]
    impl TaskApi for Tasks {
        async fn list(&self, status: Option<TaskStatus>) -> TaskApiResult<Vec<Task>>;
        async fn create(&self, candidate: &TaskCandidate) -> TaskApiResult<Task>;
        async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskApiResult<Task>;
        async fn delete(&self, id: TaskId) -> TaskApiResult<()>;
    }
}

pub(super) fn task(title: &str, status: TaskStatus) -> Task {
    let owner = OwnerId::new("alice").expect("valid owner");
    let fields = TaskCandidate::new(title)
        .with_status(status.as_str())
        .validate()
        .expect("valid candidate");
    Task::new(owner, fields, &DefaultClock)
}

/// In-memory stand-in for the task server.
///
/// List calls can be held back with [`FakeTaskApi::gate_next_list`] so tests
/// decide the order in which refetches resolve. The list snapshot is taken
/// when the request arrives, not when it resolves.
#[derive(Default)]
pub(super) struct FakeTaskApi {
    server: Mutex<Vec<Task>>,
    updates: Mutex<Vec<(TaskId, TaskChanges)>>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    list_arrived: Notify,
}

impl FakeTaskApi {
    pub(super) fn seeded(tasks: Vec<Task>) -> Self {
        Self {
            server: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Holds back the next list call that arrives until the returned sender
    /// fires.
    pub(super) fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.list_gates.lock().expect("gates lock").push_back(gate);
        release
    }

    pub(super) async fn list_arrived(&self) {
        self.list_arrived.notified().await;
    }

    pub(super) fn updates(&self) -> Vec<(TaskId, TaskChanges)> {
        self.updates.lock().expect("updates lock").clone()
    }

    pub(super) fn server_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.server
            .lock()
            .expect("server lock")
            .iter()
            .find(|stored| stored.id() == id)
            .map(Task::status)
    }
}

#[async_trait]
impl TaskApi for FakeTaskApi {
    async fn list(&self, status: Option<TaskStatus>) -> TaskApiResult<Vec<Task>> {
        let snapshot: Vec<Task> = self
            .server
            .lock()
            .expect("server lock")
            .iter()
            .filter(|stored| status.is_none_or(|wanted| stored.status() == wanted))
            .cloned()
            .collect();
        let gate = self.list_gates.lock().expect("gates lock").pop_front();
        self.list_arrived.notify_one();
        if let Some(held) = gate {
            held.await.expect("gate released");
        }
        Ok(snapshot)
    }

    async fn create(&self, candidate: &TaskCandidate) -> TaskApiResult<Task> {
        let owner = OwnerId::new("alice").expect("valid owner");
        let fields = candidate
            .clone()
            .validate()
            .map_err(|err| TaskApiError::Validation(err.to_string()))?;
        let created = Task::new(owner, fields, &DefaultClock);
        self.server
            .lock()
            .expect("server lock")
            .insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskApiResult<Task> {
        self.updates
            .lock()
            .expect("updates lock")
            .push((id, changes.clone()));
        let mut server = self.server.lock().expect("server lock");
        let stored = server
            .iter_mut()
            .find(|stored| stored.id() == id)
            .ok_or_else(|| TaskApiError::NotFound("Task not found".to_owned()))?;
        stored
            .apply_changes(changes.clone(), &DefaultClock)
            .map_err(|err| TaskApiError::Validation(err.to_string()))?;
        Ok(stored.clone())
    }

    async fn delete(&self, id: TaskId) -> TaskApiResult<()> {
        let mut server = self.server.lock().expect("server lock");
        let before = server.len();
        server.retain(|stored| stored.id() != id);
        if server.len() == before {
            return Err(TaskApiError::NotFound("Task not found".to_owned()));
        }
        Ok(())
    }
}
