// SPDX-License-Identifier: MIT

//! Profile screen: account details from the session snapshot plus a
//! password change form. No fetch happens here: the card renders whatever
//! the session already knows about the signed-in user.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::Action;
use crate::models::{PasswordChange, User};

use super::{edit_text, error_line, field_line, role_style, success_line};

const FIELD_COUNT: usize = 3;

#[derive(Debug)]
pub struct ProfileScreen {
    pub user: User,
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
    focus: usize,
    pub error: Option<String>,
    pub success: Option<String>,
    pub saving: bool,
}

impl ProfileScreen {
    pub fn new(user: User) -> Self {
        Self {
            user,
            old_password: String::new(),
            new_password: String::new(),
            new_password_confirm: String::new(),
            focus: 0,
            error: None,
            success: None,
            saving: false,
        }
    }

    /// Password inputs capture plain characters, so global single-key
    /// shortcuts must stay off while any of them is non-empty or focused.
    pub fn capturing_input(&self) -> bool {
        true
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FIELD_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Enter => return self.submit(),
            _ => {
                let buf = match self.focus {
                    0 => &mut self.old_password,
                    1 => &mut self.new_password,
                    _ => &mut self.new_password_confirm,
                };
                edit_text(buf, key);
                self.error = None;
                self.success = None;
            }
        }
        Action::None
    }

    fn submit(&mut self) -> Action {
        if self.new_password != self.new_password_confirm {
            self.error = Some("New passwords do not match".to_string());
            return Action::None;
        }
        if self.old_password.is_empty() || self.new_password.is_empty() {
            self.error = Some("All password fields are required".to_string());
            return Action::None;
        }
        Action::SubmitPassword
    }

    pub fn to_request(&self) -> PasswordChange {
        PasswordChange {
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
            new_password_confirm: self.new_password_confirm.clone(),
        }
    }

    /// Called after a successful change: wipe the inputs, show the notice.
    pub fn mark_saved(&mut self) {
        self.old_password.clear();
        self.new_password.clear();
        self.new_password_confirm.clear();
        self.focus = 0;
        self.saving = false;
        self.error = None;
        self.success = Some("Password changed successfully".to_string());
    }

    pub fn help_line(&self) -> &'static str {
        "Tab: next field  |  Enter: change password  |  Ctrl+D: dashboard  |  Ctrl+L: sign out"
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, area: Rect, screen: &ProfileScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(8)])
        .split(area);

    render_card(f, chunks[0], &screen.user);
    render_password_form(f, chunks[1], screen);
}

fn render_card(f: &mut Frame, area: Rect, user: &User) {
    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![
            Span::styled("Name      ", label),
            Span::raw(user.full_name()),
        ]),
        Line::from(vec![
            Span::styled("Username  ", label),
            Span::raw(user.username.clone()),
        ]),
        Line::from(vec![
            Span::styled("Email     ", label),
            Span::raw(user.email.clone()),
        ]),
        Line::from(vec![
            Span::styled("Role      ", label),
            Span::styled(
                user.role.to_string(),
                role_style(user.role).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" My Profile "),
    );
    f.render_widget(card, area);
}

fn render_password_form(f: &mut Frame, area: Rect, screen: &ProfileScreen) {
    let mut lines = Vec::new();

    if screen.saving {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if let Some(err) = &screen.error {
            lines.push(error_line(err));
            lines.push(Line::from(""));
        }
        if let Some(msg) = &screen.success {
            lines.push(success_line(msg));
            lines.push(Line::from(""));
        }
        lines.push(field_line(
            "Current",
            &screen.old_password,
            screen.focus == 0,
            true,
        ));
        lines.push(field_line(
            "New",
            &screen.new_password,
            screen.focus == 1,
            true,
        ));
        lines.push(field_line(
            "Confirm new",
            &screen.new_password_confirm,
            screen.focus == 2,
            true,
        ));
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Change Password "),
    );
    f.render_widget(form, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn me() -> User {
        User {
            id: 1,
            username: "pat".into(),
            email: "pat@example.com".into(),
            first_name: "Pat".into(),
            last_name: "Kim".into(),
            role: Role::Member,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn mismatched_new_passwords_block_submit() {
        let mut screen = ProfileScreen::new(me());
        screen.old_password = "old".into();
        screen.new_password = "abc".into();
        screen.new_password_confirm = "abd".into();
        assert!(matches!(screen.handle_key(&key(KeyCode::Enter)), Action::None));
        assert_eq!(screen.error.as_deref(), Some("New passwords do not match"));
    }

    #[test]
    fn complete_form_submits() {
        let mut screen = ProfileScreen::new(me());
        screen.old_password = "old".into();
        screen.new_password = "abc".into();
        screen.new_password_confirm = "abc".into();
        assert!(matches!(
            screen.handle_key(&key(KeyCode::Enter)),
            Action::SubmitPassword
        ));
        let req = screen.to_request();
        assert_eq!(req.old_password, "old");
        assert_eq!(req.new_password_confirm, "abc");
    }

    #[test]
    fn mark_saved_clears_fields_and_sets_notice() {
        let mut screen = ProfileScreen::new(me());
        screen.old_password = "old".into();
        screen.new_password = "abc".into();
        screen.new_password_confirm = "abc".into();
        screen.mark_saved();
        assert!(screen.old_password.is_empty());
        assert!(screen.new_password.is_empty());
        assert_eq!(
            screen.success.as_deref(),
            Some("Password changed successfully")
        );
    }

    #[test]
    fn typing_clears_stale_notices() {
        let mut screen = ProfileScreen::new(me());
        screen.success = Some("Password changed successfully".into());
        screen.handle_key(&key(KeyCode::Char('x')));
        assert!(screen.success.is_none());
        assert_eq!(screen.old_password, "x");
    }
}
