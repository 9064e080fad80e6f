use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Widget},
};

use crate::models::{DashboardStats, Project};
use crate::ui::formatter::Formatter;

// Centralized color scheme
pub struct ColorScheme;

impl ColorScheme {
    pub const GRAY_TEXT: Color = Color::Rgb(160, 160, 160);
    pub const WHITE_TEXT: Color = Color::Rgb(240, 240, 240);

    pub const CLEAN_BG: Color = Color::Rgb(20, 20, 20);
    pub const CLEAN_ACCENT: Color = Color::Rgb(217, 119, 87); // Terracotta-ish
    pub const CLEAN_BLUE: Color = Color::Rgb(100, 150, 255);
    pub const CLEAN_GREEN: Color = Color::Rgb(100, 200, 100);
    pub const CLEAN_GOLD: Color = Color::Rgb(217, 179, 87);
    pub const SIDEBAR_BG: Color = Color::Rgb(30, 58, 138);

    pub fn status_color(project: &Project) -> Color {
        if project.is_completed() {
            Self::CLEAN_GREEN
        } else {
            Self::CLEAN_BLUE
        }
    }

    pub fn card_block(selected: bool) -> Block<'static> {
        let border = if selected {
            Self::CLEAN_ACCENT
        } else {
            Self::GRAY_TEXT
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(Self::CLEAN_BG))
    }
}

pub struct Spinner {
    frames: Vec<&'static str>,
    current: usize,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            frames: vec!["|", "/", "-", "\\"],
            current: 0,
        }
    }

    pub fn next(&mut self) -> &'static str {
        let frame = self.frames[self.current];
        self.current = (self.current + 1) % self.frames.len();
        frame
    }

    pub fn current(&self) -> &'static str {
        self.frames[self.current]
    }
}

pub struct StatCardsWidget;

impl StatCardsWidget {
    pub fn cards(stats: &DashboardStats) -> [(&'static str, String); 4] {
        [
            ("Total Projects", stats.total_projects.to_string()),
            ("Active", stats.active_projects.to_string()),
            ("Completed", stats.completed_projects.to_string()),
            ("Tasks This Week", stats.tasks_this_week.to_string()),
        ]
    }

    pub fn render(stats: &DashboardStats, area: Rect, buf: &mut Buffer) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        for (i, (label, value)) in Self::cards(stats).iter().enumerate() {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ColorScheme::GRAY_TEXT))
                .style(Style::default().bg(ColorScheme::CLEAN_BG));

            Paragraph::new(vec![
                Line::from(Span::styled(*label, Style::default().fg(ColorScheme::GRAY_TEXT))),
                Line::from(Span::styled(
                    value.as_str(),
                    Style::default()
                        .fg(ColorScheme::WHITE_TEXT)
                        .add_modifier(Modifier::BOLD),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center)
            .render(cols[i], buf);
        }
    }
}

pub struct ProjectCardWidget;

impl ProjectCardWidget {
    pub fn render(project: &Project, selected: bool, area: Rect, buf: &mut Buffer) {
        let block = ColorScheme::card_block(selected);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Deadline
                Constraint::Length(1), // Milestones
                Constraint::Length(1), // Progress bar
                Constraint::Length(1), // Progress label
                Constraint::Min(0),
            ])
            .split(inner);

        let title_style = if selected {
            Formatter::create_highlight_style()
        } else {
            Style::default()
                .fg(ColorScheme::WHITE_TEXT)
                .add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Formatter::truncate(
            project.display_title(),
            inner.width as usize,
        ))
        .style(title_style)
        .render(rows[0], buf);

        Paragraph::new(format!("Deadline: {}", Formatter::format_deadline(project)))
            .style(Style::default().fg(ColorScheme::GRAY_TEXT))
            .render(rows[1], buf);

        Paragraph::new(Formatter::format_milestones(project))
            .style(Style::default().fg(ColorScheme::GRAY_TEXT))
            .render(rows[2], buf);

        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(ColorScheme::status_color(project))
                    .bg(Color::DarkGray),
            )
            .ratio(Formatter::progress_ratio(project))
            .label("")
            .render(rows[3], buf);

        Paragraph::new(Formatter::format_progress(project))
            .alignment(Alignment::Right)
            .style(
                Style::default()
                    .fg(ColorScheme::CLEAN_BLUE)
                    .add_modifier(Modifier::BOLD),
            )
            .render(rows[4], buf);
    }
}
