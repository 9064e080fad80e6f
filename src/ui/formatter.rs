use ratatui::{
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

use crate::models::Project;

pub struct Formatter;

impl Formatter {
    /// `Deadline: ...` line of a project card.
    pub fn format_deadline(project: &Project) -> String {
        match (&project.end_date, project.deadline()) {
            (None, _) => "No deadline".to_string(),
            (Some(_), Some(deadline)) => deadline.format("%Y-%m-%d").to_string(),
            (Some(_), None) => "Invalid date".to_string(),
        }
    }

    pub fn format_milestones(project: &Project) -> String {
        format!("Milestones: {}", project.milestone_count())
    }

    /// Progress exactly as the backend reported it, trailing `.0` dropped.
    pub fn format_progress(project: &Project) -> String {
        let progress = project.progress_or_default();
        if progress.fract() == 0.0 {
            format!("{}% Complete", progress as i64)
        } else {
            format!("{:.1}% Complete", progress)
        }
    }

    /// Gauge ratio in `0.0..=1.0`; out-of-range progress is clamped.
    pub fn progress_ratio(project: &Project) -> f64 {
        (project.progress_or_default() / 100.0).clamp(0.0, 1.0)
    }

    pub fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{}…", kept)
        }
    }

    pub fn create_header_block(title: &str) -> Block {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan))
    }

    pub fn create_highlight_style() -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }
}
