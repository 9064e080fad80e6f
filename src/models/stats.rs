use rand::Rng;
use serde::{Deserialize, Serialize};

use super::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub tasks_this_week: usize,
}

/// Stand-in for a "tasks due this week" metric. The projects endpoint carries
/// no task data, so this is NOT derived from anything real.
///
/// `Random` is non-deterministic and must be excluded from equality
/// assertions; `Fixed` pins the value.
///
/// In config it is written as `"random"` or a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "StubRepr", into = "StubRepr")]
pub enum TasksThisWeekStub {
    #[default]
    Random,
    Fixed(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StubRepr {
    Fixed(usize),
    Named(String),
}

impl TryFrom<StubRepr> for TasksThisWeekStub {
    type Error = String;

    fn try_from(repr: StubRepr) -> Result<Self, Self::Error> {
        match repr {
            StubRepr::Fixed(value) => Ok(TasksThisWeekStub::Fixed(value)),
            StubRepr::Named(name) if name.eq_ignore_ascii_case("random") => {
                Ok(TasksThisWeekStub::Random)
            }
            StubRepr::Named(name) => Err(format!(
                "expected \"random\" or a number for tasks_this_week, got {:?}",
                name
            )),
        }
    }
}

impl From<TasksThisWeekStub> for StubRepr {
    fn from(stub: TasksThisWeekStub) -> Self {
        match stub {
            TasksThisWeekStub::Random => StubRepr::Named("random".to_string()),
            TasksThisWeekStub::Fixed(value) => StubRepr::Fixed(value),
        }
    }
}

impl TasksThisWeekStub {
    pub fn estimate(&self, active_projects: usize) -> usize {
        match self {
            TasksThisWeekStub::Random => rand::rng().random_range(0..10) + active_projects,
            TasksThisWeekStub::Fixed(value) => *value,
        }
    }
}

impl DashboardStats {
    pub fn compute(projects: &[Project], stub: TasksThisWeekStub) -> Self {
        let active_projects = projects.iter().filter(|p| p.is_active()).count();
        let completed_projects = projects.iter().filter(|p| p.is_completed()).count();

        Self {
            total_projects: projects.len(),
            active_projects,
            completed_projects,
            tasks_this_week: stub.estimate(active_projects),
        }
    }

    /// Recomputes from `projects` unless the list is empty, in which case the
    /// previous figures stay. Returns whether anything was recomputed.
    pub fn refresh(&mut self, projects: &[Project], stub: TasksThisWeekStub) -> bool {
        if projects.is_empty() {
            return false;
        }
        *self = Self::compute(projects, stub);
        true
    }
}
