// SPDX-License-Identifier: MIT
//! Wire-format data model for the task-management API.
//!
//! Field names and enum spellings mirror the backend JSON exactly, so
//! the serde derives stay annotation-free except where the wire shape
//! demands it (optional keys, renamed enum variants).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Roles ───────────────────────────────────────────────────────────────

/// Account role. Drives every permission decision in [`crate::policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Member];

    /// Wire spelling, also used for display ("admin", "manager", "member").
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Task status ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire spelling, used in the `status` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Human label for list rows and the status selector.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Next status in display order, wrapping. Used by selector widgets.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    pub fn prev(self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::Done,
            TaskStatus::InProgress => TaskStatus::Todo,
            TaskStatus::Done => TaskStatus::InProgress,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Users ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

// ─── Tasks ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub assignee: Option<i64>,
    #[serde(default)]
    pub assignee_details: Option<User>,
    pub created_by: i64,
    #[serde(default)]
    pub created_by_details: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Assignee display name, or "Unassigned" when nobody is set.
    pub fn assignee_name(&self) -> String {
        self.assignee_details
            .as_ref()
            .map(User::full_name)
            .unwrap_or_else(|| "Unassigned".to_string())
    }

    /// Deadline as `YYYY-MM-DD`, or an empty string when unset.
    pub fn deadline_date(&self) -> String {
        self.deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Per-status task counts from `GET /tasks/stats/`, already scoped to the
/// caller's role by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStats {
    pub total: u64,
    pub todo: u64,
    pub in_progress: u64,
    pub done: u64,
}

// ─── Request payloads ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Body for `POST /tasks/`. A blank deadline or assignee is omitted from
/// the JSON entirely (absent key, not `null`), matching what the server's
/// create serializer expects.
#[derive(Debug, Default, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<i64>,
}

/// Body for `PATCH /tasks/{id}/`. `None` means "leave unchanged"; the key
/// is not serialized. Members may populate nothing but `status`; the
/// server rejects any other key from them.
#[derive(Debug, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password: String,
    pub password_confirm: String,
}

/// Body for `PUT /users/{id}/`: identity fields only, never a password.
#[derive(Debug, Serialize)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

// ─── Responses ───────────────────────────────────────────────────────────

/// Login and register both return the full session triple.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// `POST /auth/token/refresh/`. The refresh token only rotates when the
/// server is configured to do so, hence the optional second field.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// ─── Task list filters ───────────────────────────────────────────────────

/// Client-side filter state for the task list. Serialized into query
/// parameters; the server applies them on top of role visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee: Option<i64>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee.is_none()
    }

    /// Query pairs for `GET /tasks/`. Unset filters produce no pair.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(assignee) = self.assignee {
            pairs.push(("assignee", assignee.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            role,
        }
    }

    #[test]
    fn role_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"manager\"").unwrap(),
            Role::Manager
        );
    }

    #[test]
    fn status_uses_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"todo\"").unwrap(),
            TaskStatus::Todo
        );
    }

    #[test]
    fn status_cycle_wraps_both_ways() {
        assert_eq!(TaskStatus::Done.next(), TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.prev(), TaskStatus::Done);
        for status in TaskStatus::ALL {
            assert_eq!(status.next().prev(), status);
        }
    }

    #[test]
    fn task_decodes_with_null_assignee() {
        let json = r#"{
            "id": 7,
            "title": "Ship it",
            "description": "",
            "status": "todo",
            "deadline": null,
            "assignee": null,
            "assignee_details": null,
            "created_by": 1,
            "created_by_details": null,
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.assignee, None);
        assert_eq!(task.assignee_name(), "Unassigned");
        assert_eq!(task.deadline_date(), "");
    }

    #[test]
    fn task_decodes_with_nested_assignee_details() {
        let json = r#"{
            "id": 8,
            "title": "Review",
            "description": "desc",
            "status": "in_progress",
            "deadline": "2024-02-01T00:00:00Z",
            "assignee": 3,
            "assignee_details": {
                "id": 3,
                "username": "user3",
                "email": "user3@example.com",
                "first_name": "Sam",
                "last_name": "Lee",
                "role": "member"
            },
            "created_by": 2,
            "created_by_details": null,
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-16T09:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.assignee_name(), "Sam Lee");
        assert_eq!(task.deadline_date(), "2024-02-01");
    }

    #[test]
    fn task_patch_omits_unset_fields() {
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "done" }));
    }

    #[test]
    fn task_draft_omits_blank_deadline_and_assignee() {
        let draft = TaskDraft {
            title: "New".into(),
            description: String::new(),
            status: TaskStatus::Todo,
            deadline: None,
            assignee: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("deadline").is_none());
        assert!(json.get("assignee").is_none());
        assert_eq!(json["title"], "New");
    }

    #[test]
    fn task_draft_serializes_deadline_as_plain_date() {
        let draft = TaskDraft {
            title: "Dated".into(),
            deadline: NaiveDate::from_ymd_opt(2024, 3, 9),
            ..TaskDraft::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["deadline"], "2024-03-09");
    }

    #[test]
    fn filter_query_pairs() {
        assert!(TaskFilter::default().query().is_empty());
        let filter = TaskFilter {
            status: Some(TaskStatus::InProgress),
            assignee: Some(42),
        };
        assert_eq!(
            filter.query(),
            vec![
                ("status", "in_progress".to_string()),
                ("assignee", "42".to_string())
            ]
        );
    }

    #[test]
    fn full_name_falls_back_to_username() {
        let mut user = sample_user(1, Role::Member);
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.full_name(), "user1");
        assert_eq!(sample_user(2, Role::Member).full_name(), "Jane Doe");
    }
}
