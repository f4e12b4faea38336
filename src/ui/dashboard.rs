//! Dashboard: per-status task counts and the most recent tasks, both
//! fetched concurrently when the screen opens. Counts arrive already
//! scoped to the signed-in role by the server.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::Action;
use crate::models::{Task, TaskStats, TaskStatus};

use super::{error_line, render_loading, status_style};

/// How many of the newest tasks the dashboard shows.
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Default)]
pub struct DashboardScreen {
    pub stats: TaskStats,
    pub recent: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Replace screen data after a (re)load. The task list arrives newest
    /// first from the server; only the head is kept.
    pub fn set_data(&mut self, stats: TaskStats, mut tasks: Vec<Task>) {
        tasks.truncate(RECENT_LIMIT);
        self.stats = stats;
        self.recent = tasks;
        self.error = None;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('r') => Action::Reload,
            _ => Action::None,
        }
    }

    pub fn help_line(&self) -> &'static str {
        "1-4: screens  |  r: refresh  |  Ctrl+L: logout  |  q: quit"
    }
}

pub fn render(f: &mut Frame, area: Rect, screen: &DashboardScreen) {
    if screen.loading {
        render_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // error banner
            Constraint::Length(5), // stat cards
            Constraint::Min(3),    // recent tasks
        ])
        .split(area);

    if let Some(err) = &screen.error {
        f.render_widget(Paragraph::new(error_line(err)), chunks[0]);
    }

    render_stat_cards(f, chunks[1], &screen.stats);
    render_recent(f, chunks[2], &screen.recent);
}

fn render_stat_cards(f: &mut Frame, area: Rect, stats: &TaskStats) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let entries: [(&str, u64, Style); 4] = [
        ("Total", stats.total, Style::default().fg(Color::White)),
        ("To Do", stats.todo, status_style(TaskStatus::Todo)),
        (
            "In Progress",
            stats.in_progress,
            status_style(TaskStatus::InProgress),
        ),
        ("Done", stats.done, status_style(TaskStatus::Done)),
    ];

    for (i, (label, count, style)) in entries.iter().enumerate() {
        let card = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                count.to_string(),
                style.add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(*label));
        f.render_widget(card, cards[i]);
    }
}

fn render_recent(f: &mut Frame, area: Rect, recent: &[Task]) {
    let items: Vec<ListItem> = if recent.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No tasks yet.",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        recent
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
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Recent Tasks "),
    );
    f.render_widget(list, area);
}
