//! Typed calls for the `/tasks` routes.

use std::sync::Arc;

use dora_core::envelope;
use dora_core::{ApiError, NewTask, Task};
use serde_json::json;

use crate::{ApiRequest, Transport};

/// Task CRUD API over an arbitrary [`Transport`].
#[derive(Clone)]
pub struct TaskApi {
    transport: Arc<dyn Transport>,
}

impl TaskApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        envelope::list(self.transport.send(ApiRequest::get("/tasks/")).await?)
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task, ApiError> {
        let body = serde_json::to_value(task).map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope::object(self.transport.send(ApiRequest::post("/tasks/", body)).await?)
    }

    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<(), ApiError> {
        let req = ApiRequest::put(format!("/tasks/{id}"), json!({ "completed": completed }));
        self.transport.send(req).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.transport.send(ApiRequest::delete(format!("/tasks/{id}"))).await?;
        Ok(())
    }
}
