// SPDX-License-Identifier: MIT
//! Task list and task form.
//!
//! The list shows whatever the server returns for the signed-in role and
//! the active filters. Edit and delete are offered per row only when the
//! permission predicates allow them; the form itself narrows to the
//! fields the role may touch, so a member sees nothing but the status
//! selector.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::Action;
use crate::models::{Role, Task, TaskDraft, TaskFilter, TaskPatch, TaskStatus, User};
use crate::policy::{self, TaskField};

use super::{
    centered_rect, choice_line, edit_text, error_line, field_line, render_loading, status_style,
};

// ─── Screen state ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct TasksScreen {
    /// Immutable snapshot of the signed-in user, taken when the screen
    /// opened. Permission checks run against this, never global state.
    pub current_user: User,
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub filter: TaskFilter,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub form: Option<TaskForm>,
    pub confirm_delete: Option<i64>,
}

impl TasksScreen {
    pub fn new(current_user: User) -> Self {
        Self {
            current_user,
            tasks: Vec::new(),
            users: Vec::new(),
            filter: TaskFilter::default(),
            selected: 0,
            loading: true,
            error: None,
            form: None,
            confirm_delete: None,
        }
    }

    /// Replace list data after a (re)load, clamping the selection.
    pub fn set_data(&mut self, tasks: Vec<Task>, users: Vec<User>) {
        self.tasks = tasks;
        self.users = users;
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
        self.error = None;
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    /// True while a form or confirm dialog is open. Plain-letter
    /// shortcuts are suspended so typing reaches the dialog.
    pub fn capturing_input(&self) -> bool {
        self.form.is_some() || self.confirm_delete.is_some()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if self.form.is_some() {
            return self.handle_form_key(key);
        }

        if let Some(id) = self.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete = None;
                    return Action::DeleteTask(id);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_delete = None;
                }
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('s') => {
                self.filter.status = match self.filter.status {
                    None => Some(TaskStatus::Todo),
                    Some(TaskStatus::Todo) => Some(TaskStatus::InProgress),
                    Some(TaskStatus::InProgress) => Some(TaskStatus::Done),
                    Some(TaskStatus::Done) => None,
                };
                return Action::Reload;
            }
            KeyCode::Char('a') => {
                self.filter.assignee = self.next_assignee_filter();
                return Action::Reload;
            }
            KeyCode::Char('x') => {
                if !self.filter.is_empty() {
                    self.filter = TaskFilter::default();
                    return Action::Reload;
                }
            }
            KeyCode::Char('n') => {
                if policy::can_create_tasks(self.current_user.role) {
                    self.form = Some(TaskForm::create(self.current_user.role));
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(task) = self.selected_task() {
                    if policy::can_edit_task(&self.current_user, task) {
                        self.form = Some(TaskForm::edit(task, self.current_user.role));
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    if policy::can_delete_task(&self.current_user, task) {
                        self.confirm_delete = Some(task.id);
                    }
                }
            }
            _ => {}
        }
        Action::None
    }

    fn handle_form_key(&mut self, key: &KeyEvent) -> Action {
        let candidates: Vec<i64> = policy::assignee_candidates(&self.users, &self.current_user)
            .iter()
            .map(|u| u.id)
            .collect();
        let Some(form) = self.form.as_mut() else {
            return Action::None;
        };
        match form.handle_key(key, &candidates) {
            FormOutcome::Close => self.form = None,
            FormOutcome::Submit => return Action::SubmitTaskForm,
            FormOutcome::Editing => {}
        }
        Action::None
    }

    /// Cycle the assignee filter through every known user, then back to
    /// "all". The filter is not restricted to assignable users; it
    /// matches whatever the dropdown in the browser UI offered.
    fn next_assignee_filter(&self) -> Option<i64> {
        let ids: Vec<i64> = self.users.iter().map(|u| u.id).collect();
        if ids.is_empty() {
            return None;
        }
        match self.filter.assignee {
            None => Some(ids[0]),
            Some(current) => match ids.iter().position(|&id| id == current) {
                Some(pos) if pos + 1 < ids.len() => Some(ids[pos + 1]),
                _ => None,
            },
        }
    }

    fn user_name(&self, id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(User::full_name)
            .unwrap_or_else(|| format!("user #{id}"))
    }

    pub fn help_line(&self) -> &'static str {
        if self.form.is_some() {
            return "Tab: next field  |  ←/→: choose  |  Enter: save  |  Esc: cancel";
        }
        if self.confirm_delete.is_some() {
            return "y: delete  |  n: cancel";
        }
        if policy::can_create_tasks(self.current_user.role) {
            "n: new  |  Enter: edit  |  d: delete  |  s/a: filters  |  x: clear  |  r: refresh  |  q: quit"
        } else {
            "Enter: update status  |  s/a: filters  |  x: clear  |  r: refresh  |  q: quit"
        }
    }
}

// ─── Task form ───────────────────────────────────────────────────────────

enum FormOutcome {
    Editing,
    Submit,
    Close,
}

/// Modal task form. `fields` is the role's editable field list from the
/// permission rules; focus can only ever land on those fields.
#[derive(Debug)]
pub struct TaskForm {
    pub editing: Option<i64>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: String,
    pub assignee: Option<i64>,
    fields: &'static [TaskField],
    focus: usize,
    pub error: Option<String>,
    pub saving: bool,
}

impl TaskForm {
    pub fn create(role: Role) -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo,
            deadline: String::new(),
            assignee: None,
            fields: policy::editable_fields(role),
            focus: 0,
            error: None,
            saving: false,
        }
    }

    pub fn edit(task: &Task, role: Role) -> Self {
        Self {
            editing: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            deadline: task.deadline_date(),
            assignee: task.assignee,
            fields: policy::editable_fields(role),
            focus: 0,
            error: None,
            saving: false,
        }
    }

    fn focused_field(&self) -> TaskField {
        self.fields[self.focus]
    }

    fn handle_key(&mut self, key: &KeyEvent, candidates: &[i64]) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Close,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
            }
            _ => match self.focused_field() {
                TaskField::Title => {
                    edit_text(&mut self.title, key);
                }
                TaskField::Description => {
                    edit_text(&mut self.description, key);
                }
                TaskField::Deadline => {
                    edit_text(&mut self.deadline, key);
                }
                TaskField::Status => match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => self.status = self.status.next(),
                    KeyCode::Left => self.status = self.status.prev(),
                    _ => {}
                },
                TaskField::Assignee => match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => {
                        self.assignee = next_candidate(self.assignee, candidates);
                    }
                    KeyCode::Left => {
                        self.assignee = prev_candidate(self.assignee, candidates);
                    }
                    _ => {}
                },
            },
        }
        FormOutcome::Editing
    }

    /// Create payload. Errors are user-facing form messages.
    pub fn build_draft(&self) -> Result<TaskDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            deadline: parse_deadline(&self.deadline)?,
            assignee: self.assignee,
        })
    }

    /// Update payload. A member's patch carries `status` and nothing
    /// else, no matter what the rest of the form holds.
    pub fn build_patch(&self, role: Role) -> Result<TaskPatch, String> {
        if role == Role::Member {
            return Ok(TaskPatch {
                status: Some(self.status),
                ..TaskPatch::default()
            });
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(TaskPatch {
            title: Some(title.to_string()),
            description: Some(self.description.trim().to_string()),
            status: Some(self.status),
            deadline: parse_deadline(&self.deadline)?,
            assignee: self.assignee,
        })
    }
}

/// Step forward through `None (Unassigned) → candidates… → None`.
fn next_candidate(current: Option<i64>, candidates: &[i64]) -> Option<i64> {
    match current {
        None => candidates.first().copied(),
        Some(id) => match candidates.iter().position(|&c| c == id) {
            Some(pos) if pos + 1 < candidates.len() => Some(candidates[pos + 1]),
            _ => None,
        },
    }
}

fn prev_candidate(current: Option<i64>, candidates: &[i64]) -> Option<i64> {
    match current {
        None => candidates.last().copied(),
        Some(id) => match candidates.iter().position(|&c| c == id) {
            Some(0) | None => None,
            Some(pos) => Some(candidates[pos - 1]),
        },
    }
}

fn parse_deadline(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Deadline must be YYYY-MM-DD".to_string())
}

// ─── Rendering ───────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, area: Rect, screen: &TasksScreen) {
    if screen.loading {
        render_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // filter line / error banner
            Constraint::Min(3),    // task list
            Constraint::Length(4), // selection details
        ])
        .split(area);

    if let Some(err) = &screen.error {
        f.render_widget(Paragraph::new(error_line(err)), chunks[0]);
    } else {
        render_filter_line(f, chunks[0], screen);
    }
    render_task_list(f, chunks[1], screen);
    render_details(f, chunks[2], screen);

    if let Some(form) = &screen.form {
        render_form(f, area, screen, form);
    } else if let Some(id) = screen.confirm_delete {
        render_confirm(f, area, screen, id);
    }
}

fn render_filter_line(f: &mut Frame, area: Rect, screen: &TasksScreen) {
    let status = screen
        .filter
        .status
        .map(TaskStatus::label)
        .unwrap_or("All");
    let assignee = screen
        .filter
        .assignee
        .map(|id| screen.user_name(id))
        .unwrap_or_else(|| "All".to_string());
    let line = Line::from(vec![
        Span::styled(" Filters ", Style::default().fg(Color::DarkGray)),
        Span::styled("status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(status, Style::default().fg(Color::White)),
        Span::styled("   assignee: ", Style::default().fg(Color::DarkGray)),
        Span::styled(assignee, Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_task_list(f: &mut Frame, area: Rect, screen: &TasksScreen) {
    let items: Vec<ListItem> = if screen.tasks.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No tasks found.",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        screen
            .tasks
            .iter()
            .map(|task| {
                let mut spans = vec![
                    Span::styled(
                        format!("{:<11}", task.status.label()),
                        status_style(task.status),
                    ),
                    Span::raw(" "),
                    Span::styled(task.title.clone(), Style::default().fg(Color::White)),
                    Span::styled(
                        format!("  → {}", task.assignee_name()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                if task.deadline.is_some() {
                    spans.push(Span::styled(
                        format!("  due {}", task.deadline_date()),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Tasks "))
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 40, 60))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    let mut state = ListState::default();
    if !screen.tasks.is_empty() {
        state.select(Some(screen.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_details(f: &mut Frame, area: Rect, screen: &TasksScreen) {
    let block = Block::default().borders(Borders::ALL).title(" Details ");
    let Some(task) = screen.selected_task() else {
        f.render_widget(block, area);
        return;
    };

    let created_by = task
        .created_by_details
        .as_ref()
        .map(User::full_name)
        .unwrap_or_else(|| format!("user #{}", task.created_by));

    let mut actions = Vec::new();
    if policy::can_edit_task(&screen.current_user, task) {
        actions.push("edit");
    }
    if policy::can_delete_task(&screen.current_user, task) {
        actions.push("delete");
    }
    let actions = if actions.is_empty() {
        "read-only".to_string()
    } else {
        actions.join(", ")
    };

    let description = if task.description.is_empty() {
        Span::styled("(no description)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(task.description.clone())
    };

    let text = vec![
        Line::from(description),
        Line::from(vec![
            Span::styled("created by ", Style::default().fg(Color::DarkGray)),
            Span::raw(created_by),
            Span::styled("   you can: ", Style::default().fg(Color::DarkGray)),
            Span::styled(actions, Style::default().fg(Color::Cyan)),
        ]),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
}

fn render_form(f: &mut Frame, area: Rect, screen: &TasksScreen, form: &TaskForm) {
    let card = centered_rect(70, 70, area);
    f.render_widget(Clear, card);

    let title = if form.editing.is_some() {
        " Edit Task "
    } else {
        " Create Task "
    };

    let mut lines = Vec::new();
    if screen.current_user.role == Role::Member {
        lines.push(Line::from(Span::styled(
            "Members can only update task status",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }
    if form.saving {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if let Some(err) = &form.error {
            lines.push(error_line(err));
            lines.push(Line::from(""));
        }
        for (i, field) in form.fields.iter().enumerate() {
            let focused = form.focus == i;
            let line = match field {
                TaskField::Title => field_line("Title", &form.title, focused, false),
                TaskField::Description => {
                    field_line("Description", &form.description, focused, false)
                }
                TaskField::Status => choice_line("Status", form.status.label(), focused),
                TaskField::Deadline => field_line("Deadline", &form.deadline, focused, false),
                TaskField::Assignee => {
                    let shown = match form.assignee {
                        Some(id) => {
                            let role = screen
                                .users
                                .iter()
                                .find(|u| u.id == id)
                                .map(|u| u.role.as_str())
                                .unwrap_or("?");
                            format!("{} ({role})", screen.user_name(id))
                        }
                        None => "Unassigned".to_string(),
                    };
                    choice_line("Assignee", &shown, focused)
                }
            };
            lines.push(line);
        }
    }

    let form_widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(form_widget, card);
}

fn render_confirm(f: &mut Frame, area: Rect, screen: &TasksScreen, id: i64) {
    let card = centered_rect(50, 20, area);
    f.render_widget(Clear, card);

    let title = screen
        .tasks
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.title.clone())
        .unwrap_or_else(|| format!("task #{id}"));

    let text = vec![
        Line::from(format!("Delete \"{title}\"?")),
        Line::from(""),
        Line::from(Span::styled(
            "y: delete   n: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let dialog = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm ")
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(dialog, card);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("u{id}"),
            email: format!("u{id}@example.com"),
            first_name: "U".into(),
            last_name: format!("{id}"),
            role,
        }
    }

    fn task(id: i64, created_by: i64, assignee: Option<i64>) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: String::new(),
            status: TaskStatus::Todo,
            deadline: None,
            assignee,
            assignee_details: None,
            created_by,
            created_by_details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn member_patch_contains_status_only() {
        let member = user(5, Role::Member);
        let mut form = TaskForm::edit(&task(1, 2, Some(5)), member.role);
        // Even with other fields populated, nothing but status is sent.
        form.title = "hijacked title".into();
        form.assignee = Some(7);
        form.status = TaskStatus::Done;
        let patch = form.build_patch(Role::Member).unwrap();
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "done" }));
    }

    #[test]
    fn manager_patch_carries_all_fields() {
        let mut form = TaskForm::edit(&task(1, 2, None), Role::Manager);
        form.title = "Updated".into();
        form.description = "More detail".into();
        form.deadline = "2024-06-01".into();
        form.assignee = Some(3);
        form.status = TaskStatus::InProgress;
        let patch = form.build_patch(Role::Manager).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Updated"));
        assert_eq!(patch.assignee, Some(3));
        assert_eq!(
            patch.deadline,
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn member_form_has_only_the_status_field() {
        let form = TaskForm::edit(&task(1, 2, Some(5)), Role::Member);
        assert_eq!(form.fields, &[TaskField::Status]);
    }

    #[test]
    fn create_requires_a_title() {
        let form = TaskForm::create(Role::Admin);
        assert_eq!(form.build_draft().unwrap_err(), "Title is required");
    }

    #[test]
    fn malformed_deadline_is_rejected() {
        let mut form = TaskForm::create(Role::Admin);
        form.title = "t".into();
        form.deadline = "tomorrow".into();
        assert_eq!(
            form.build_draft().unwrap_err(),
            "Deadline must be YYYY-MM-DD"
        );
    }

    #[test]
    fn blank_deadline_is_omitted_not_invalid() {
        let mut form = TaskForm::create(Role::Admin);
        form.title = "t".into();
        let draft = form.build_draft().unwrap();
        assert_eq!(draft.deadline, None);
    }

    #[test]
    fn assignee_cycles_through_candidates_and_unassigned() {
        let candidates = [3, 4];
        let mut current = None;
        current = next_candidate(current, &candidates);
        assert_eq!(current, Some(3));
        current = next_candidate(current, &candidates);
        assert_eq!(current, Some(4));
        current = next_candidate(current, &candidates);
        assert_eq!(current, None);
        assert_eq!(prev_candidate(None, &candidates), Some(4));
        assert_eq!(prev_candidate(Some(3), &candidates), None);
    }

    #[test]
    fn member_cannot_open_create_form() {
        let mut screen = TasksScreen::new(user(5, Role::Member));
        screen.set_data(vec![task(1, 2, Some(5))], vec![]);
        screen.handle_key(&key(KeyCode::Char('n')));
        assert!(screen.form.is_none());
    }

    #[test]
    fn manager_cannot_open_edit_for_foreign_task() {
        let mut screen = TasksScreen::new(user(2, Role::Manager));
        screen.set_data(vec![task(1, 9, None)], vec![]);
        screen.handle_key(&key(KeyCode::Enter));
        assert!(screen.form.is_none());
    }

    #[test]
    fn admin_opens_edit_for_any_task() {
        let mut screen = TasksScreen::new(user(1, Role::Admin));
        screen.set_data(vec![task(1, 9, None)], vec![]);
        screen.handle_key(&key(KeyCode::Enter));
        assert!(screen.form.is_some());
    }

    #[test]
    fn member_never_reaches_delete_confirm() {
        let mut screen = TasksScreen::new(user(5, Role::Member));
        screen.set_data(vec![task(1, 2, Some(5))], vec![]);
        screen.handle_key(&key(KeyCode::Char('d')));
        assert!(screen.confirm_delete.is_none());
    }

    #[test]
    fn delete_needs_explicit_confirmation() {
        let mut screen = TasksScreen::new(user(1, Role::Admin));
        screen.set_data(vec![task(7, 9, None)], vec![]);
        screen.handle_key(&key(KeyCode::Char('d')));
        assert_eq!(screen.confirm_delete, Some(7));
        let action = screen.handle_key(&key(KeyCode::Char('n')));
        assert!(matches!(action, Action::None));
        assert!(screen.confirm_delete.is_none());

        screen.handle_key(&key(KeyCode::Char('d')));
        let action = screen.handle_key(&key(KeyCode::Char('y')));
        assert!(matches!(action, Action::DeleteTask(7)));
    }

    #[test]
    fn status_filter_cycles_back_to_all() {
        let mut screen = TasksScreen::new(user(1, Role::Admin));
        screen.loading = false;
        for expected in [
            Some(TaskStatus::Todo),
            Some(TaskStatus::InProgress),
            Some(TaskStatus::Done),
            None,
        ] {
            let action = screen.handle_key(&key(KeyCode::Char('s')));
            assert!(matches!(action, Action::Reload));
            assert_eq!(screen.filter.status, expected);
        }
    }

    #[test]
    fn selection_clamps_after_shorter_reload() {
        let mut screen = TasksScreen::new(user(1, Role::Admin));
        screen.set_data(vec![task(1, 1, None), task(2, 1, None), task(3, 1, None)], vec![]);
        screen.selected = 2;
        screen.set_data(vec![task(1, 1, None)], vec![]);
        assert_eq!(screen.selected, 0);
    }
}
