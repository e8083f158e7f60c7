//! Panels for the terminal interface

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use super::{EntityStatus, Phase, Progress};
use crate::entity::EntityKind;

const BORDER: Color = Color::Blue;
const MAX_LOG_ENTRIES: usize = 100;

/// Current phase plus one line of context (endpoint, database path)
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Connecting,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = match self.phase {
            Phase::Complete => Color::Green,
            _ => Color::Cyan,
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let indicator = match self.phase {
            Phase::Connecting => "◐",
            Phase::Fetching => "↓",
            Phase::CreatingSchema => "⊞",
            Phase::Loading => "⚙",
            Phase::Summarizing => "Σ",
            Phase::Complete => "✓",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", indicator), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" SpaceX to SQLite ")
            .border_style(Style::default().fg(BORDER));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// One line per entity kind
pub struct EntityPanel {
    statuses: Vec<(EntityKind, EntityStatus)>,
}

impl EntityPanel {
    /// Rows plus borders and header
    pub const HEIGHT: u16 = EntityKind::ALL.len() as u16 + 3;

    pub fn new() -> Self {
        Self {
            statuses: EntityKind::ALL
                .iter()
                .map(|k| (*k, EntityStatus::Pending))
                .collect(),
        }
    }

    pub fn set(&mut self, kind: EntityKind, status: EntityStatus) {
        if let Some(entry) = self.statuses.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = status;
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = self.statuses.iter().map(|(kind, status)| {
            let color = match status {
                EntityStatus::Pending => Color::DarkGray,
                EntityStatus::Fetched(_) => Color::Cyan,
                EntityStatus::Loaded(_) => Color::Green,
                EntityStatus::Failed(_) => Color::Red,
            };
            Row::new(vec![
                Cell::from(kind.as_str()),
                Cell::from(status.to_string()).style(Style::default().fg(color)),
            ])
        });

        let header = Row::new(vec!["entity", "status"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(20)])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Entities ")
                    .border_style(Style::default().fg(BORDER)),
            );

        frame.render_widget(table, area);
    }
}

/// Gauge over the steps of the run
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(BORDER));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(format!(
                "{} ({}/{})",
                progress.label, progress.current, progress.total
            ));

        frame.render_widget(gauge, area);
    }
}

/// Most recent activity, newest at the bottom
pub struct LogPanel {
    entries: Vec<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);
        let last = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = if start + i == last {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Activity ")
                .border_style(Style::default().fg(BORDER)),
        );
        frame.render_widget(list, area);
    }
}
