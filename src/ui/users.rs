//! User management screen (admin only): roster table, create/edit form,
//! delete confirmation.
//!
//! Editing an existing account never touches the password: the update
//! payload carries identity fields only. Passwords are set on create and
//! changed by the account owner from their profile.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::Action;
use crate::models::{NewUser, Role, User, UserUpdate};

use super::{
    centered_rect, choice_line, edit_text, error_line, field_line, render_loading, role_style,
};

// ─── Screen state ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UsersScreen {
    pub users: Vec<User>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub form: Option<UserForm>,
    pub confirm_delete: Option<i64>,
}

impl UsersScreen {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            selected: 0,
            loading: true,
            error: None,
            form: None,
            confirm_delete: None,
        }
    }

    pub fn set_data(&mut self, users: Vec<User>) {
        self.users = users;
        self.selected = self.selected.min(self.users.len().saturating_sub(1));
        self.error = None;
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    pub fn capturing_input(&self) -> bool {
        self.form.is_some() || self.confirm_delete.is_some()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormOutcome::Close => self.form = None,
                FormOutcome::Submit => return Action::SubmitUserForm,
                FormOutcome::Editing => {}
            }
            return Action::None;
        }

        if let Some(id) = self.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete = None;
                    return Action::DeleteUser(id);
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
                if self.selected + 1 < self.users.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('n') => self.form = Some(UserForm::create()),
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(user) = self.selected_user() {
                    self.form = Some(UserForm::edit(user));
                }
            }
            KeyCode::Char('d') => {
                if let Some(user) = self.selected_user() {
                    self.confirm_delete = Some(user.id);
                }
            }
            _ => {}
        }
        Action::None
    }

    pub fn help_line(&self) -> &'static str {
        if self.form.is_some() {
            "Tab: next field  |  ←/→: choose role  |  Enter: save  |  Esc: cancel"
        } else if self.confirm_delete.is_some() {
            "y: delete  |  n: cancel"
        } else {
            "n: new user  |  Enter: edit  |  d: delete  |  r: refresh  |  q: quit"
        }
    }
}

// ─── User form ───────────────────────────────────────────────────────────

enum FormOutcome {
    Editing,
    Submit,
    Close,
}

/// Modal user form. `editing == Some` narrows the field list; password
/// rows exist only when creating.
#[derive(Debug)]
pub struct UserForm {
    pub editing: Option<i64>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password: String,
    pub password_confirm: String,
    focus: usize,
    pub error: Option<String>,
    pub saving: bool,
}

impl UserForm {
    pub fn create() -> Self {
        Self {
            editing: None,
            username: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Member,
            password: String::new(),
            password_confirm: String::new(),
            focus: 0,
            error: None,
            saving: false,
        }
    }

    pub fn edit(user: &User) -> Self {
        Self {
            editing: Some(user.id),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            password: String::new(),
            password_confirm: String::new(),
            focus: 0,
            error: None,
            saving: false,
        }
    }

    fn field_count(&self) -> usize {
        if self.editing.is_some() {
            5
        } else {
            7
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Close,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.field_count(),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.field_count() - 1) % self.field_count();
            }
            _ if self.focus == 4 => match key.code {
                KeyCode::Right | KeyCode::Char(' ') => self.role = next_role(self.role),
                KeyCode::Left => self.role = prev_role(self.role),
                _ => {}
            },
            _ => {
                let buf = match self.focus {
                    0 => &mut self.username,
                    1 => &mut self.email,
                    2 => &mut self.first_name,
                    3 => &mut self.last_name,
                    5 => &mut self.password,
                    _ => &mut self.password_confirm,
                };
                edit_text(buf, key);
            }
        }
        FormOutcome::Editing
    }

    /// Create payload. The match check runs before any request goes out.
    pub fn to_new_user(&self) -> Result<NewUser, String> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Username and email are required".to_string());
        }
        if self.password != self.password_confirm {
            return Err("Passwords don't match".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role,
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        })
    }

    /// Update payload: identity fields only.
    pub fn to_update(&self) -> Result<UserUpdate, String> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Username and email are required".to_string());
        }
        Ok(UserUpdate {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role,
        })
    }
}

/// Selector order matches the original dropdown: member, manager, admin.
fn next_role(role: Role) -> Role {
    match role {
        Role::Member => Role::Manager,
        Role::Manager => Role::Admin,
        Role::Admin => Role::Member,
    }
}

fn prev_role(role: Role) -> Role {
    match role {
        Role::Member => Role::Admin,
        Role::Manager => Role::Member,
        Role::Admin => Role::Manager,
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, area: Rect, screen: &UsersScreen) {
    if screen.loading {
        render_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    if let Some(err) = &screen.error {
        f.render_widget(Paragraph::new(error_line(err)), chunks[0]);
    }

    render_table(f, chunks[1], screen);

    if let Some(form) = &screen.form {
        render_form(f, area, form);
    } else if let Some(id) = screen.confirm_delete {
        render_confirm(f, area, screen, id);
    }
}

fn render_table(f: &mut Frame, area: Rect, screen: &UsersScreen) {
    let header = Row::new(["Name", "Email", "Username", "Role"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = screen
        .users
        .iter()
        .map(|user| {
            Row::new(vec![
                Cell::from(user.full_name()),
                Cell::from(user.email.clone()),
                Cell::from(user.username.clone()),
                Cell::from(Span::styled(user.role.to_string(), role_style(user.role))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" User Management "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::Rgb(40, 40, 60))
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("» ");

    let mut state = TableState::default();
    if !screen.users.is_empty() {
        state.select(Some(screen.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_form(f: &mut Frame, area: Rect, form: &UserForm) {
    let card = centered_rect(60, 70, area);
    f.render_widget(Clear, card);

    let title = if form.editing.is_some() {
        " Edit User "
    } else {
        " Create User "
    };

    let mut lines = Vec::new();
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
        lines.push(field_line("Username", &form.username, form.focus == 0, false));
        lines.push(field_line("Email", &form.email, form.focus == 1, false));
        lines.push(field_line(
            "First name",
            &form.first_name,
            form.focus == 2,
            false,
        ));
        lines.push(field_line(
            "Last name",
            &form.last_name,
            form.focus == 3,
            false,
        ));
        lines.push(choice_line("Role", form.role.as_str(), form.focus == 4));
        if form.editing.is_none() {
            lines.push(field_line("Password", &form.password, form.focus == 5, true));
            lines.push(field_line(
                "Confirm",
                &form.password_confirm,
                form.focus == 6,
                true,
            ));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(widget, card);
}

fn render_confirm(f: &mut Frame, area: Rect, screen: &UsersScreen, id: i64) {
    let card = centered_rect(50, 20, area);
    f.render_widget(Clear, card);

    let name = screen
        .users
        .iter()
        .find(|u| u.id == id)
        .map(User::full_name)
        .unwrap_or_else(|| format!("user #{id}"));

    let text = vec![
        Line::from(format!("Delete user \"{name}\"?")),
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
