//! Account registration screen. A successful registration signs the new
//! account in directly; the server returns the same session triple as
//! login.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Action;
use crate::models::RegisterRequest;

use super::{centered_rect, edit_text, error_line, field_line};

const FIELD_COUNT: usize = 6;

#[derive(Debug, Default)]
pub struct RegisterScreen {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
    focus: usize,
    pub error: Option<String>,
    pub loading: bool,
}

impl RegisterScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => return Action::OpenLogin,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % FIELD_COUNT,
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Enter => return self.submit(),
            _ => {
                edit_text(self.active_buffer(), key);
            }
        }
        Action::None
    }

    fn submit(&mut self) -> Action {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            self.error = Some("Username and email are required".into());
            return Action::None;
        }
        // Checked before any request goes out, same as the password form.
        if self.password != self.password_confirm {
            self.error = Some("Passwords do not match".into());
            return Action::None;
        }
        self.error = None;
        Action::SubmitRegister
    }

    fn active_buffer(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.username,
            1 => &mut self.email,
            2 => &mut self.first_name,
            3 => &mut self.last_name,
            4 => &mut self.password,
            _ => &mut self.password_confirm,
        }
    }

    /// Request payload from the current form state.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        }
    }

    pub fn help_line(&self) -> &'static str {
        "Enter: create account  |  Tab: next field  |  Esc: back to sign in"
    }
}

pub fn render(f: &mut Frame, area: Rect, screen: &RegisterScreen) {
    let card = centered_rect(60, 70, area);
    f.render_widget(Clear, card);

    let mut lines = vec![
        Line::from(Span::styled(
            "Create your account",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if screen.loading {
        lines.push(Line::from(Span::styled(
            "Creating account…",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if let Some(err) = &screen.error {
            lines.push(error_line(err));
            lines.push(Line::from(""));
        }
        let fields: [(&str, &String, bool); FIELD_COUNT] = [
            ("Username", &screen.username, false),
            ("Email", &screen.email, false),
            ("First name", &screen.first_name, false),
            ("Last name", &screen.last_name, false),
            ("Password", &screen.password, true),
            ("Confirm", &screen.password_confirm, true),
        ];
        for (i, (label, value, masked)) in fields.iter().enumerate() {
            lines.push(field_line(label, value, screen.focus == i, *masked));
        }
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Register ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(form, card);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn filled_screen() -> RegisterScreen {
        RegisterScreen {
            username: "jane".into(),
            email: "jane@example.com".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            password: "hunter22".into(),
            password_confirm: "hunter22".into(),
            ..RegisterScreen::default()
        }
    }

    #[test]
    fn mismatched_passwords_never_submit() {
        let mut screen = filled_screen();
        screen.password_confirm = "different".into();
        let action = screen.handle_key(&key(KeyCode::Enter));
        assert!(matches!(action, Action::None));
        assert_eq!(screen.error.as_deref(), Some("Passwords do not match"));
    }

    #[test]
    fn matching_passwords_submit() {
        let mut screen = filled_screen();
        let action = screen.handle_key(&key(KeyCode::Enter));
        assert!(matches!(action, Action::SubmitRegister));
        assert!(screen.error.is_none());
    }

    #[test]
    fn request_payload_trims_identity_fields() {
        let mut screen = filled_screen();
        screen.username = " jane ".into();
        let req = screen.to_request();
        assert_eq!(req.username, "jane");
        assert_eq!(req.password, "hunter22");
    }

    #[test]
    fn tab_cycles_through_all_fields() {
        let mut screen = filled_screen();
        for _ in 0..FIELD_COUNT {
            screen.handle_key(&key(KeyCode::Tab));
        }
        assert_eq!(screen.focus, 0);
    }
}
