use log::info;

use crate::models::{filter_projects, DashboardStats, FilterCategory, Project, TasksThisWeekStub};

/// Local view state of one mounted dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    project_list: Vec<Project>,
    search_query: String,
    is_loading: bool,
    sidebar_open: bool,
    filter_category: FilterCategory,
    stats: DashboardStats,
    selected: usize,
    stub: TasksThisWeekStub,
}

impl DashboardState {
    pub fn new(initial_search: String, stub: TasksThisWeekStub) -> Self {
        Self {
            project_list: Vec::new(),
            search_query: initial_search,
            is_loading: true,
            sidebar_open: false,
            filter_category: FilterCategory::All,
            stats: DashboardStats::default(),
            selected: 0,
            stub,
        }
    }

    pub fn project_list(&self) -> &[Project] {
        &self.project_list
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn filter_category(&self) -> FilterCategory {
        self.filter_category
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Returns whether the query actually changed.
    pub fn set_search_query(&mut self, query: String) -> bool {
        if self.search_query == query {
            return false;
        }
        self.search_query = query;
        true
    }

    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    /// Replaces the collection wholesale and refreshes the stats. An empty
    /// collection keeps the previous stats.
    pub fn apply_projects(&mut self, projects: Vec<Project>) {
        self.project_list = projects;
        self.stats.refresh(&self.project_list, self.stub);
        self.clamp_selection();
    }

    pub fn filtered_projects(&self) -> Vec<&Project> {
        filter_projects(&self.project_list, self.filter_category)
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn set_filter_category(&mut self, category: FilterCategory) {
        self.filter_category = category;
        self.clamp_selection();
    }

    pub fn cycle_filter_category(&mut self) {
        self.set_filter_category(self.filter_category.next());
    }

    /// Hook for the project-creation modal, bound to both the header action
    /// and the empty-state action. Deliberately does nothing else yet.
    pub fn open_create_project_modal(&self) {
        info!("Create project requested; project creation is not available in this view");
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.filtered_projects().get(self.selected).copied()
    }

    /// Moves the card selection by `delta` positions within the filtered list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.filtered_projects().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_projects().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
