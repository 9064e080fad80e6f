use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame, Terminal,
};
use std::time::Duration;

use crate::{
    api::ProjectsApi,
    models::FilterCategory,
    state::DashboardController,
    ui::formatter::Formatter,
    ui::widgets::{ColorScheme, ProjectCardWidget, Spinner, StatCardsWidget},
};

const CARD_HEIGHT: u16 = 7;

const SIDEBAR_SECTIONS: [(&str, [&str; 3]); 2] = [
    ("MAIN", ["Dashboard", "Projects", "Tasks"]),
    ("TEAM", ["Team Members", "Messages", "Calendar"]),
];

/// Why the dashboard loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardExit {
    Quit,
    /// The user opened a project; carries its detail route.
    Navigate(String),
}

pub struct Dashboard<A: ProjectsApi> {
    controller: DashboardController<A>,
    input_mode: bool,
    projects_per_row: usize,
    spinner: Spinner,
}

impl<A: ProjectsApi> Dashboard<A> {
    pub fn new(controller: DashboardController<A>, projects_per_row: usize) -> Self {
        Self {
            controller,
            input_mode: false,
            projects_per_row: projects_per_row.max(1),
            spinner: Spinner::new(),
        }
    }

    pub fn controller(&self) -> &DashboardController<A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DashboardController<A> {
        &mut self.controller
    }

    pub fn input_mode(&self) -> bool {
        self.input_mode
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<DashboardExit> {
        loop {
            self.controller.pump();
            self.spinner.next();

            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(exit) = self.handle_key(key) {
                            return Ok(exit);
                        }
                    }
                }
            }
        }
    }

    /// Maps one key press onto the controller. Returns `Some` when the loop
    /// should end.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DashboardExit> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(DashboardExit::Quit);
        }

        if self.input_mode {
            self.handle_search_key(key);
            return None;
        }

        let per_row = self.projects_per_row as isize;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardExit::Quit),
            KeyCode::Char('/') => self.input_mode = true,
            KeyCode::Char('b') => self.controller.state_mut().toggle_sidebar(),
            KeyCode::Char('n') => self.controller.state().open_create_project_modal(),
            KeyCode::Char('r') => self.controller.refresh(),
            KeyCode::Char('f') | KeyCode::Tab => {
                self.controller.state_mut().cycle_filter_category()
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.controller
                    .state_mut()
                    .set_filter_category(FilterCategory::ALL[index]);
            }
            KeyCode::Left | KeyCode::Char('h') => self.controller.state_mut().move_selection(-1),
            KeyCode::Right | KeyCode::Char('l') => self.controller.state_mut().move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => {
                self.controller.state_mut().move_selection(-per_row)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.controller.state_mut().move_selection(per_row)
            }
            KeyCode::Enter => {
                if let Some(project) = self.controller.state().selected_project() {
                    let route = project.detail_route();
                    debug!("Navigating to {}", route);
                    return Some(DashboardExit::Navigate(route));
                }
            }
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = false,
            KeyCode::Char(c) => {
                let mut query = self.controller.state().search_query().to_string();
                query.push(c);
                self.controller.handle_search_input(query);
            }
            KeyCode::Backspace => {
                let mut query = self.controller.state().search_query().to_string();
                if query.pop().is_some() {
                    self.controller.handle_search_input(query);
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let area = f.size();
        let main_area = if self.controller.state().sidebar_open() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(24), Constraint::Min(0)])
                .split(area);
            self.render_sidebar(f, columns[0]);
            columns[1]
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header with search
                Constraint::Length(1), // Filter tabs
                Constraint::Length(4), // Stats cards
                Constraint::Min(5),    // Project grid
                Constraint::Length(2), // Keyboard hints
            ])
            .split(main_area);

        self.render_header(f, chunks[0]);
        self.render_filter_tabs(f, chunks[1]);
        StatCardsWidget::render(self.controller.state().stats(), chunks[2], f.buffer_mut());
        self.render_projects(f, chunks[3]);
        self.render_keyboard_hints(f, chunks[4]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(ColorScheme::GRAY_TEXT));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(20),
                Constraint::Length(36),
                Constraint::Length(22),
            ])
            .split(inner);

        f.render_widget(
            Paragraph::new("Project Dashboard").style(
                Style::default()
                    .fg(ColorScheme::WHITE_TEXT)
                    .add_modifier(Modifier::BOLD),
            ),
            columns[0],
        );

        let query = self.controller.state().search_query();
        let search_line = if query.is_empty() && !self.input_mode {
            Line::from(Span::styled(
                "Search projects...",
                Style::default().fg(ColorScheme::GRAY_TEXT),
            ))
        } else {
            let style = if self.input_mode {
                Style::default().fg(ColorScheme::CLEAN_BLUE)
            } else {
                Style::default().fg(ColorScheme::WHITE_TEXT)
            };
            let cursor = if self.input_mode { "_" } else { "" };
            Line::from(Span::styled(format!("{}{}", query, cursor), style))
        };
        f.render_widget(
            Paragraph::new(Line::from(
                [vec![Span::raw("/ ")], search_line.spans].concat(),
            )),
            columns[1],
        );

        f.render_widget(
            Paragraph::new("[n] Create Project")
                .alignment(Alignment::Right)
                .style(
                    Style::default()
                        .fg(ColorScheme::CLEAN_ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
            columns[2],
        );
    }

    fn render_filter_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = FilterCategory::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| Line::from(format!("{} {}", i + 1, c.label())))
            .collect();
        let selected = FilterCategory::ALL
            .iter()
            .position(|c| *c == self.controller.state().filter_category())
            .unwrap_or(0);

        f.render_widget(
            Tabs::new(titles)
                .select(selected)
                .style(Style::default().fg(ColorScheme::GRAY_TEXT))
                .highlight_style(
                    Style::default()
                        .fg(ColorScheme::CLEAN_GOLD)
                        .add_modifier(Modifier::BOLD),
                ),
            area,
        );
    }

    fn render_projects(&self, f: &mut Frame, area: Rect) {
        let state = self.controller.state();

        if state.is_loading() {
            f.render_widget(
                Paragraph::new(format!("{} Loading projects...", self.spinner.current()))
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(ColorScheme::CLEAN_BLUE)),
                Self::centered_line(area),
            );
            return;
        }

        if state.project_list().is_empty() {
            self.render_empty_state(f, area);
            return;
        }

        let projects = state.filtered_projects();
        if projects.is_empty() {
            f.render_widget(
                Paragraph::new(format!(
                    "No {} projects",
                    state.filter_category().label().to_lowercase()
                ))
                .alignment(Alignment::Center)
                .style(Style::default().fg(ColorScheme::GRAY_TEXT)),
                Self::centered_line(area),
            );
            return;
        }

        let per_row = self.projects_per_row;
        let total_rows = (projects.len() + per_row - 1) / per_row;
        let visible_rows = ((area.height / CARD_HEIGHT) as usize).max(1);
        let selected_row = state.selected() / per_row;
        let first_row = selected_row.saturating_sub(visible_rows - 1);

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (slot, row) in (first_row..total_rows).take(visible_rows).enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
                .split(row_areas[slot]);

            for col in 0..per_row {
                let index = row * per_row + col;
                if let Some(project) = projects.get(index) {
                    ProjectCardWidget::render(
                        project,
                        index == state.selected(),
                        cells[col],
                        f.buffer_mut(),
                    );
                }
            }
        }
    }

    fn render_empty_state(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "No projects",
                Style::default()
                    .fg(ColorScheme::WHITE_TEXT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Get started by creating a new project.",
                Style::default().fg(ColorScheme::GRAY_TEXT),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[n] New Project",
                Style::default()
                    .fg(ColorScheme::CLEAN_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        let height = (lines.len() as u16).min(area.height);
        let target = Rect::new(
            area.x,
            area.y + area.height.saturating_sub(height) / 2,
            area.width,
            height,
        );
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), target);
    }

    fn render_sidebar(&self, f: &mut Frame, area: Rect) {
        let mut items = Vec::new();
        for (heading, entries) in SIDEBAR_SECTIONS {
            items.push(ListItem::new(Line::from(Span::styled(
                heading,
                Style::default().fg(ColorScheme::GRAY_TEXT),
            ))));
            for entry in entries {
                items.push(ListItem::new(format!("  {}", entry)));
            }
            items.push(ListItem::new(""));
        }

        let list = List::new(items)
            .block(Formatter::create_header_block(" Dashboard "))
            .style(
                Style::default()
                    .fg(ColorScheme::WHITE_TEXT)
                    .bg(ColorScheme::SIDEBAR_BG),
            );
        f.render_widget(list, area);
    }

    fn render_keyboard_hints(&self, f: &mut Frame, area: Rect) {
        let hints: &[(&str, &str)] = if self.input_mode {
            &[("type", "Search"), ("Enter/Esc", "Done")]
        } else {
            &[
                ("q", "Quit"),
                ("/", "Search"),
                ("1-4", "Filter"),
                ("←↑↓→", "Select"),
                ("Enter", "Open"),
                ("n", "New"),
                ("b", "Sidebar"),
                ("r", "Refresh"),
            ]
        };

        let spans: Vec<Span> = hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {} ", key),
                        Style::default()
                            .fg(ColorScheme::CLEAN_GOLD)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{} ", desc), Style::default().fg(ColorScheme::GRAY_TEXT)),
                ]
            })
            .collect();

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(ColorScheme::GRAY_TEXT));
        f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn centered_line(area: Rect) -> Rect {
        Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, TasksThisWeekStub};
    use crate::state::{MemoryQueryStore, SharedState, SEARCH_PARAM};
    use crate::test_utils::{sample_projects, MockProjectsApi};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn mounted(api: Arc<MockProjectsApi>, shared: &SharedState) -> Dashboard<MockProjectsApi> {
        let mut controller = DashboardController::mount(
            api,
            shared.subscribe(),
            Box::new(MemoryQueryStore::new()),
            TasksThisWeekStub::Fixed(0),
        );
        controller.settle().await;
        Dashboard::new(controller, 3)
    }

    fn screen<A: ProjectsApi>(dashboard: &Dashboard<A>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| dashboard.render(f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(&buffer.get(x, y).symbol);
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_typing_updates_search_and_query_store() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let mut dashboard = mounted(Arc::clone(&api), &shared).await;

        dashboard.handle_key(key(KeyCode::Char('/')));
        assert!(dashboard.input_mode());
        for c in "web".chars() {
            dashboard.handle_key(key(KeyCode::Char(c)));
        }
        dashboard.handle_key(key(KeyCode::Backspace));
        dashboard.handle_key(key(KeyCode::Enter));

        assert!(!dashboard.input_mode());
        let controller = dashboard.controller();
        assert_eq!(controller.state().search_query(), "we");
        assert_eq!(controller.query().get(SEARCH_PARAM).as_deref(), Some("we"));
    }

    #[tokio::test]
    async fn test_q_typed_in_search_does_not_quit() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let mut dashboard = mounted(api, &shared).await;

        dashboard.handle_key(key(KeyCode::Char('/')));
        assert_eq!(dashboard.handle_key(key(KeyCode::Char('q'))), None);
        dashboard.handle_key(key(KeyCode::Esc));
        assert_eq!(
            dashboard.handle_key(key(KeyCode::Char('q'))),
            Some(DashboardExit::Quit)
        );
    }

    #[tokio::test]
    async fn test_filter_keys_and_navigation() {
        let api = Arc::new(MockProjectsApi::new());
        api.push_projects(sample_projects());
        let shared = SharedState::new("tok", "");
        let mut dashboard = mounted(api, &shared).await;

        dashboard.handle_key(key(KeyCode::Char('3')));
        assert_eq!(
            dashboard.controller().state().filter_category(),
            FilterCategory::Completed
        );
        assert_eq!(
            dashboard.handle_key(key(KeyCode::Enter)),
            Some(DashboardExit::Navigate("/projects/2".to_string()))
        );

        dashboard.handle_key(key(KeyCode::Tab));
        assert_eq!(
            dashboard.controller().state().filter_category(),
            FilterCategory::Recent
        );
        dashboard.handle_key(key(KeyCode::Right));
        assert_eq!(
            dashboard.handle_key(key(KeyCode::Enter)),
            Some(DashboardExit::Navigate("/projects/2".to_string()))
        );
    }

    #[tokio::test]
    async fn test_sidebar_and_create_keys() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let mut dashboard = mounted(api, &shared).await;

        dashboard.handle_key(key(KeyCode::Char('b')));
        assert!(dashboard.controller().state().sidebar_open());
        assert!(screen(&dashboard).contains("Team Members"));

        assert_eq!(dashboard.handle_key(key(KeyCode::Char('n'))), None);
        dashboard.handle_key(key(KeyCode::Char('b')));
        assert!(!dashboard.controller().state().sidebar_open());
    }

    #[tokio::test]
    async fn test_render_cards_and_stats() {
        let api = Arc::new(MockProjectsApi::new());
        api.push_projects(sample_projects());
        let shared = SharedState::new("tok", "");
        let dashboard = mounted(api, &shared).await;

        let text = screen(&dashboard);
        assert!(text.contains("Project Dashboard"));
        assert!(text.contains("Website relaunch"));
        assert!(text.contains("Mobile app"));
        assert!(text.contains("Milestones: 1"));
        assert!(text.contains("40% Complete"));
        assert!(text.contains("Total Projects"));
    }

    #[tokio::test]
    async fn test_render_empty_state() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let dashboard = mounted(api, &shared).await;

        let text = screen(&dashboard);
        assert!(text.contains("No projects"));
        assert!(text.contains("[n] New Project"));
    }

    #[tokio::test]
    async fn test_render_loading_state() {
        let api = Arc::new(MockProjectsApi::new());
        let _gate = api.push_gated_for("");
        let shared = SharedState::new("tok", "");
        let controller = DashboardController::mount(
            api,
            shared.subscribe(),
            Box::new(MemoryQueryStore::new()),
            TasksThisWeekStub::Fixed(0),
        );
        let dashboard = Dashboard::new(controller, 3);

        assert!(screen(&dashboard).contains("Loading projects..."));
    }

    #[tokio::test]
    async fn test_grid_scrolls_to_selection() {
        let api = Arc::new(MockProjectsApi::new());
        let many: Vec<Project> = (1..=30)
            .map(|i| Project::new(i, &format!("Project {:02}", i)))
            .collect();
        api.push_projects(many);
        let shared = SharedState::new("tok", "");
        let mut dashboard = mounted(api, &shared).await;

        for _ in 0..9 {
            dashboard.handle_key(key(KeyCode::Down));
        }
        let text = screen(&dashboard);
        assert!(text.contains("Project 28"));
        assert!(!text.contains("Project 01"));
    }
}
