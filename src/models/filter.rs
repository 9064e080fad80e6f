use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::project::Project;

/// How many records the `recent` category keeps.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    #[default]
    All,
    Active,
    Completed,
    Recent,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 4] = [
        FilterCategory::All,
        FilterCategory::Active,
        FilterCategory::Completed,
        FilterCategory::Recent,
    ];

    /// Lenient parse: anything unrecognized means the unfiltered list.
    pub fn parse_or_all(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn next(self) -> Self {
        match self {
            FilterCategory::All => FilterCategory::Active,
            FilterCategory::Active => FilterCategory::Completed,
            FilterCategory::Completed => FilterCategory::Recent,
            FilterCategory::Recent => FilterCategory::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::All => "All",
            FilterCategory::Active => "Active",
            FilterCategory::Completed => "Completed",
            FilterCategory::Recent => "Recent",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCategory::All => write!(f, "all"),
            FilterCategory::Active => write!(f, "active"),
            FilterCategory::Completed => write!(f, "completed"),
            FilterCategory::Recent => write!(f, "recent"),
        }
    }
}

impl std::str::FromStr for FilterCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FilterCategory::All),
            "active" => Ok(FilterCategory::Active),
            "completed" => Ok(FilterCategory::Completed),
            "recent" => Ok(FilterCategory::Recent),
            _ => Err(anyhow::anyhow!("Invalid filter category: {}", s)),
        }
    }
}

/// Applies a category to the in-memory project list without touching it.
pub fn filter_projects(projects: &[Project], category: FilterCategory) -> Vec<&Project> {
    match category {
        FilterCategory::All => projects.iter().collect(),
        FilterCategory::Active => projects.iter().filter(|p| p.is_active()).collect(),
        FilterCategory::Completed => projects.iter().filter(|p| p.is_completed()).collect(),
        FilterCategory::Recent => {
            let mut sorted: Vec<&Project> = projects.iter().collect();
            sorted.sort_by(|a, b| newest_first(a, b));
            sorted.truncate(RECENT_LIMIT);
            sorted
        }
    }
}

// Records without a parsable timestamp go last.
fn newest_first(a: &Project, b: &Project) -> Ordering {
    match (a.updated_at_parsed(), b.updated_at_parsed()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
