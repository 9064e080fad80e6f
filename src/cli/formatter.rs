use crate::models::{DashboardStats, Project};
use crate::ui::formatter::Formatter;

pub struct CliFormatter;

impl CliFormatter {
    pub fn print_section_header(title: &str) {
        println!("\n{}", ansi_color("cyan", title, true));
        println!("{}", "─".repeat(title.chars().count()).dimmed());
    }

    pub fn print_field(label: &str, value: &str, color: Option<&str>) {
        let colored_value = match color {
            Some(c) => ansi_color(c, value, false),
            None => value.to_string(),
        };
        println!("  {:<16} {}", format!("{}:", label).dimmed(), colored_value);
    }

    pub fn print_field_bold(label: &str, value: &str, color: Option<&str>) {
        let colored_value = match color {
            Some(c) => ansi_color(c, value, true),
            None => bold(value),
        };
        println!("  {:<16} {}", format!("{}:", label).dimmed(), colored_value);
    }

    pub fn print_stats(stats: &DashboardStats) {
        Self::print_field_bold("Total Projects", &stats.total_projects.to_string(), None);
        Self::print_field_bold("Active", &stats.active_projects.to_string(), Some("blue"));
        Self::print_field_bold(
            "Completed",
            &stats.completed_projects.to_string(),
            Some("green"),
        );
        Self::print_field_bold(
            "Tasks This Week",
            &stats.tasks_this_week.to_string(),
            Some("yellow"),
        );
    }

    pub fn print_project_entry(project: &Project) {
        let (symbol, color) = if project.is_completed() {
            ("●", "green")
        } else {
            ("○", "blue")
        };

        println!(
            "  {} {:<30} {:<14} {:<15} {}",
            ansi_color(color, symbol, false),
            ansi_color("yellow", &Formatter::truncate(project.display_title(), 30), true),
            Formatter::format_progress(project).replace(" Complete", ""),
            Formatter::format_milestones(project),
            format!("due {}", Formatter::format_deadline(project)).dimmed()
        );
    }

    pub fn print_empty_state(message: &str) {
        println!("\n  {}", message.dimmed());
    }

    pub fn print_success(message: &str) {
        println!(
            "  {} {}",
            ansi_color("green", "✓", true),
            ansi_color("green", message, false)
        );
    }

    pub fn print_warning(message: &str) {
        println!(
            "  {} {}",
            ansi_color("yellow", "⚠", true),
            ansi_color("yellow", message, false)
        );
    }

    pub fn print_info(message: &str) {
        println!("  {} {}", ansi_color("cyan", "ℹ", true), message);
    }
}

pub fn ansi_color(color: &str, text: &str, bold: bool) -> String {
    let color_code = match color {
        "red" => "31",
        "green" => "32",
        "yellow" => "33",
        "blue" => "34",
        "magenta" => "35",
        "cyan" => "36",
        "white" => "37",
        "gray" => "90",
        _ => "37",
    };

    if bold {
        format!("\x1b[1;{}m{}\x1b[0m", color_code, text)
    } else {
        format!("\x1b[{}m{}\x1b[0m", color_code, text)
    }
}

fn bold(text: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", text)
}

pub trait StringFormat {
    fn dimmed(&self) -> String;
}

impl StringFormat for str {
    fn dimmed(&self) -> String {
        format!("\x1b[2m{}\x1b[0m", self)
    }
}
