pub mod config;
pub mod filter;
pub mod project;
pub mod stats;

pub use config::Config;
pub use filter::{filter_projects, FilterCategory};
pub use project::{Project, ProjectId};
pub use stats::{DashboardStats, TasksThisWeekStub};
