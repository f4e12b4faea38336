//! Role-based permission rules for tasks and screens.
//!
//! Every account holds a [`Role`]. The role decides which tasks a user may
//! edit or delete, which form fields they may touch, and which screens they
//! can open. The predicates here are pure and total; they gate what the UI
//! offers, while the server independently enforces the same rules.

use crate::models::{Role, Task, User};

// ─── Task form fields ────────────────────────────────────────────────────

/// Fields of the task form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Deadline,
    Assignee,
}

/// Full field set, the admin/manager view of the form.
pub const ALL_TASK_FIELDS: &[TaskField] = &[
    TaskField::Title,
    TaskField::Description,
    TaskField::Status,
    TaskField::Deadline,
    TaskField::Assignee,
];

/// Members may only move a task between statuses.
const MEMBER_TASK_FIELDS: &[TaskField] = &[TaskField::Status];

// ─── Task predicates ─────────────────────────────────────────────────────

/// Whether `user` may open `task` for editing.
///
/// Admins edit anything, managers edit what they created, members edit
/// (the status of) what is assigned to them.
pub fn can_edit_task(user: &User, task: &Task) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Manager => task.created_by == user.id,
        Role::Member => task.assignee == Some(user.id),
    }
}

/// Whether `user` may delete `task`. Members never delete.
pub fn can_delete_task(user: &User, task: &Task) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Manager => task.created_by == user.id,
        Role::Member => false,
    }
}

/// The form fields `role` is allowed to change.
pub fn editable_fields(role: Role) -> &'static [TaskField] {
    match role {
        Role::Admin | Role::Manager => ALL_TASK_FIELDS,
        Role::Member => MEMBER_TASK_FIELDS,
    }
}

pub fn field_is_editable(role: Role, field: TaskField) -> bool {
    editable_fields(role).contains(&field)
}

/// Only admins and managers create tasks; the server returns 403 for
/// members, so the UI never offers the action to them.
pub fn can_create_tasks(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager)
}

/// The user-management screen is admin-only.
pub fn can_manage_users(role: Role) -> bool {
    matches!(role, Role::Admin)
}

// ─── Assignee candidates ─────────────────────────────────────────────────

/// Users eligible for the assignee selector.
///
/// Admins are never assignable, and a manager cannot pick themselves
/// (the server rejects that assignment outright).
pub fn assignee_candidates<'a>(users: &'a [User], current: &User) -> Vec<&'a User> {
    users
        .iter()
        .filter(|u| {
            if u.role == Role::Admin {
                return false;
            }
            if current.role == Role::Manager && u.id == current.id {
                return false;
            }
            true
        })
        .collect()
}
