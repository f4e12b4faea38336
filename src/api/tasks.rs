//! Task endpoints. The server scopes every list and every stat to the
//! caller's role; the client never widens what it is given.

use crate::error::ApiError;
use crate::models::{Task, TaskDraft, TaskFilter, TaskPatch, TaskStats};

use super::ApiClient;

impl ApiClient {
    /// `GET /tasks/`, optionally filtered by status and assignee.
    pub async fn list_tasks(&self, token: &str, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        self.send(self.get(token, "/tasks/").query(&filter.query()))
            .await
    }

    /// `GET /tasks/{id}/`.
    pub async fn get_task(&self, token: &str, id: i64) -> Result<Task, ApiError> {
        self.send(self.get(token, &format!("/tasks/{id}/"))).await
    }

    /// `POST /tasks/`. Admin/manager only; the server answers 403 otherwise.
    pub async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.send(self.post(token, "/tasks/").json(draft)).await
    }

    /// `PATCH /tasks/{id}/` with only the fields present in `patch`.
    pub async fn update_task(
        &self,
        token: &str,
        id: i64,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        self.send(self.patch(token, &format!("/tasks/{id}/")).json(patch))
            .await
    }

    /// `DELETE /tasks/{id}/`.
    pub async fn delete_task(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.send_no_body(self.delete(token, &format!("/tasks/{id}/")))
            .await
    }

    /// `GET /tasks/stats/`: per-status counts for the dashboard.
    pub async fn task_stats(&self, token: &str) -> Result<TaskStats, ApiError> {
        self.send(self.get(token, "/tasks/stats/")).await
    }
}
