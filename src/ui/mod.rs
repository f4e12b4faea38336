// SPDX-License-Identifier: MIT
//! Terminal UI: screen chrome and shared rendering helpers.
//!
//! Layout mirrors the app structure: a one-line navigation bar at the
//! top, the active screen in the middle, a one-line key help at the
//! bottom. Each screen module owns its state struct, key handling, and
//! body rendering; this module draws the frame around them.

pub mod dashboard;
pub mod login;
pub mod profile;
pub mod register;
pub mod tasks;
pub mod users;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Nav, Screen};
use crate::models::{Role, TaskStatus};
use crate::policy;

/// Top-level draw. Anonymous screens (login/register) get no nav bar.
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    match &app.screen {
        Screen::Login(screen) => {
            let chunks = split_plain(area);
            login::render(f, chunks[0], screen);
            render_help(f, chunks[1], screen.help_line());
        }
        Screen::Register(screen) => {
            let chunks = split_plain(area);
            register::render(f, chunks[0], screen);
            render_help(f, chunks[1], screen.help_line());
        }
        Screen::Dashboard(screen) => {
            let chunks = split_chrome(area);
            render_nav(f, chunks[0], app, Nav::Dashboard);
            dashboard::render(f, chunks[1], screen);
            render_help(f, chunks[2], screen.help_line());
        }
        Screen::Tasks(screen) => {
            let chunks = split_chrome(area);
            render_nav(f, chunks[0], app, Nav::Tasks);
            tasks::render(f, chunks[1], screen);
            render_help(f, chunks[2], screen.help_line());
        }
        Screen::Users(screen) => {
            let chunks = split_chrome(area);
            render_nav(f, chunks[0], app, Nav::Users);
            users::render(f, chunks[1], screen);
            render_help(f, chunks[2], screen.help_line());
        }
        Screen::Profile(screen) => {
            let chunks = split_chrome(area);
            render_nav(f, chunks[0], app, Nav::Profile);
            profile::render(f, chunks[1], screen);
            render_help(f, chunks[2], screen.help_line());
        }
    }
}

fn split_chrome(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // nav bar
            Constraint::Min(3),    // screen body
            Constraint::Length(1), // help line
        ])
        .split(area)
}

fn split_plain(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area)
}

fn render_nav(f: &mut Frame, area: Rect, app: &App, current: Nav) {
    let mut spans = vec![Span::styled(
        " taskdeck ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    let mut tabs = vec![
        (Nav::Dashboard, "1 Dashboard"),
        (Nav::Tasks, "2 Tasks"),
    ];
    let role = app.session.as_ref().map(|s| s.user.role);
    if role.is_some_and(policy::can_manage_users) {
        tabs.push((Nav::Users, "3 Users"));
    }
    tabs.push((Nav::Profile, "4 Profile"));

    for (nav, label) in tabs {
        spans.push(Span::raw(" "));
        let style = if nav == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {label} "), style));
    }

    if let Some(session) = &app.session {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} ", session.user.full_name()),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::styled(
            format!("({})", session.user.role),
            role_style(session.user.role),
        ));
    }

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Rgb(28, 28, 40)).fg(Color::White));
    f.render_widget(bar, area);
}

fn render_help(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

// ─── Shared helpers ──────────────────────────────────────────────────────

/// Apply a printable character or backspace to a text buffer. Returns
/// true when the key was consumed.
pub(crate) fn edit_text(buf: &mut String, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buf.push(c);
            true
        }
        KeyCode::Backspace => {
            buf.pop();
            true
        }
        _ => false,
    }
}

/// Centered sub-rectangle, sized as percentages of `r`. Used for forms
/// and confirmation dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub(crate) fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Todo => Style::default().fg(Color::Yellow),
        TaskStatus::InProgress => Style::default().fg(Color::Blue),
        TaskStatus::Done => Style::default().fg(Color::Green),
    }
}

pub(crate) fn role_style(role: Role) -> Style {
    match role {
        Role::Admin => Style::default().fg(Color::Red),
        Role::Manager => Style::default().fg(Color::Blue),
        Role::Member => Style::default().fg(Color::Green),
    }
}

/// One form row: right-aligned label, value, block cursor when focused.
pub(crate) fn field_line(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:>14}: "), label_style),
        Span::styled(format!("{shown}{cursor}"), Style::default().fg(Color::White)),
    ])
}

/// One selector row: the value is chosen with ←/→ rather than typed.
pub(crate) fn choice_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value_span = if focused {
        Span::styled(
            format!("‹ {value} ›"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::White))
    };
    Line::from(vec![
        Span::styled(format!("{label:>14}: "), label_style),
        value_span,
    ])
}

pub(crate) fn error_line(msg: &str) -> Line<'static> {
    Line::from(Span::styled(
        msg.to_string(),
        Style::default().fg(Color::Red),
    ))
}

pub(crate) fn success_line(msg: &str) -> Line<'static> {
    Line::from(Span::styled(
        msg.to_string(),
        Style::default().fg(Color::Green),
    ))
}

/// Centered "Loading…" body used while a screen fetch is in flight.
pub(crate) fn render_loading(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new("Loading…")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    let centered = centered_rect(30, 20, area);
    f.render_widget(msg, centered);
}
