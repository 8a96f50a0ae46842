//! To-do task store.
//!
//! Loading the list is isolated (errors are recorded in `status.error`);
//! create, toggle and remove return their failures to the caller.

use dora_client::TaskApi;
use dora_core::{ApiError, NewTask, Task};
use tokio::sync::watch;
use tracing::info;

use crate::status::{LoadState, Slot, bare_call, isolated_call};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    pub items: Vec<Task>,
    pub status: LoadState,
}

impl TaskState {
    fn slot(&mut self) -> &mut LoadState {
        &mut self.status
    }
}

const SLOT: Slot<TaskState> = TaskState::slot;

pub struct TaskStore {
    api: TaskApi,
    state: watch::Sender<TaskState>,
}

impl TaskStore {
    pub fn new(api: TaskApi) -> Self {
        let (state, _) = watch::channel(TaskState::default());
        Self { api, state }
    }

    pub fn snapshot(&self) -> TaskState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub async fn fetch_tasks(&self) {
        isolated_call(&self.state, SLOT, "task list", self.api.list(), |s, items: &Vec<Task>| {
            s.items = items.clone();
        })
        .await;
    }

    pub async fn add_task(&self, task: NewTask) -> Result<Task, ApiError> {
        let created = bare_call(&self.state, Some(SLOT), self.api.create(&task), |s, created: &Task| {
            s.items.push(created.clone());
        })
        .await?;
        info!("[task-store] task {} added: {}", created.id, created.title);
        Ok(created)
    }

    /// Set a task's completion flag, then patch the local copy if present.
    pub async fn toggle_task(&self, id: i64, completed: bool) -> Result<(), ApiError> {
        bare_call(
            &self.state,
            Some(SLOT),
            self.api.set_completed(id, completed),
            |s, _: &()| {
                if let Some(item) = s.items.iter_mut().find(|t| t.id == id) {
                    item.completed = completed;
                }
            },
        )
        .await
    }

    pub async fn remove_task(&self, id: i64) -> Result<(), ApiError> {
        bare_call(&self.state, Some(SLOT), self.api.delete(id), |s, _: &()| {
            s.items.retain(|t| t.id != id);
        })
        .await?;
        info!("[task-store] task {id} removed");
        Ok(())
    }
}
