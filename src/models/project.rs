use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Status literal the backend uses for finished projects.
pub const COMPLETED_STATUS: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Number(n) => write!(f, "{}", n),
            ProjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        ProjectId::Number(id)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        ProjectId::Text(id.to_string())
    }
}

/// A project record as returned by `GET /api/projects`.
///
/// The backend owns this shape; only the fields the dashboard reads are typed,
/// everything else is carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub milestones: Option<Vec<Value>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id: ProjectId::Number(id),
            title: Some(title.to_string()),
            end_date: None,
            progress: None,
            milestones: None,
            status: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_updated_at(mut self, updated_at: &str) -> Self {
        self.updated_at = Some(updated_at.to_string());
        self
    }

    pub fn with_end_date(mut self, end_date: &str) -> Self {
        self.end_date = Some(end_date.to_string());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_milestones(mut self, milestones: Vec<Value>) -> Self {
        self.milestones = Some(milestones);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(COMPLETED_STATUS)
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled project")
    }

    /// Progress in percent, 0 when the backend sent nothing usable.
    pub fn progress_or_default(&self) -> f64 {
        match self.progress {
            Some(p) if p.is_finite() => p,
            _ => 0.0,
        }
    }

    pub fn milestone_count(&self) -> usize {
        self.milestones.as_ref().map_or(0, Vec::len)
    }

    pub fn updated_at_parsed(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.end_date
            .as_deref()
            .and_then(parse_timestamp)
            .map(|d| d.with_timezone(&Local))
    }

    pub fn detail_route(&self) -> String {
        format!("/projects/{}", self.id)
    }
}

/// Parses the timestamp formats the backend emits: RFC 3339, a naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`, or a bare date. Naive values
/// are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
