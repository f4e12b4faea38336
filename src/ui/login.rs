//! Sign-in screen: email + password, error banner, link to register.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Action;

use super::{centered_rect, edit_text, error_line, field_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
    focus: Field,
    pub error: Option<String>,
    pub loading: bool,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: Field::Email,
            error: None,
            loading: false,
        }
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login screen with a notice already showing, used when the app
    /// lands here after a session expires.
    pub fn with_notice(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        match (key.code, key.modifiers) {
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => return Action::OpenRegister,
            (KeyCode::Tab, _) | (KeyCode::Down, _) => {
                self.focus = match self.focus {
                    Field::Email => Field::Password,
                    Field::Password => Field::Email,
                };
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.focus = match self.focus {
                    Field::Email => Field::Password,
                    Field::Password => Field::Email,
                };
            }
            (KeyCode::Enter, _) => {
                if self.email.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("Email and password are required".into());
                    return Action::None;
                }
                self.error = None;
                return Action::SubmitLogin;
            }
            _ => {
                let buf = match self.focus {
                    Field::Email => &mut self.email,
                    Field::Password => &mut self.password,
                };
                edit_text(buf, key);
            }
        }
        Action::None
    }

    pub fn help_line(&self) -> &'static str {
        "Enter: sign in  |  Tab: next field  |  Ctrl+R: create account  |  Ctrl+C: quit"
    }
}

pub fn render(f: &mut Frame, area: Rect, screen: &LoginScreen) {
    let card = centered_rect(60, 50, area);
    f.render_widget(Clear, card);

    let mut lines = vec![
        Line::from(Span::styled(
            "Team Task Manager",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if screen.loading {
        lines.push(Line::from(Span::styled(
            "Signing in…",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if let Some(err) = &screen.error {
            lines.push(error_line(err));
            lines.push(Line::from(""));
        }
        lines.push(field_line(
            "Email",
            &screen.email,
            screen.focus == Field::Email,
            false,
        ));
        lines.push(field_line(
            "Password",
            &screen.password,
            screen.focus == Field::Password,
            true,
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "   Don't have an account? Press Ctrl+R to register.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Sign in ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(form, card);
}
