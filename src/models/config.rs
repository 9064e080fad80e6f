use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::stats::TasksThisWeekStub;
use crate::utils::validation::{
    validate_base_url, validate_log_level, validate_projects_per_row, ValidationError,
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub projects_per_row: usize,
    pub tasks_this_week: TasksThisWeekStub,
    pub log_level: String,
    pub custom_settings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            request_timeout_secs: None,
            projects_per_row: 3,
            tasks_this_week: TasksThisWeekStub::Random,
            log_level: "info".to_string(),
            custom_settings: HashMap::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_base_url(&self.api_base_url)?;
        validate_projects_per_row(self.projects_per_row)?;
        validate_log_level(&self.log_level)?;

        if self.request_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Request timeout must be greater than 0"));
        }

        Ok(())
    }

    /// Environment overrides; empty values count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROJDASH_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup("PROJDASH_AUTH_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.auth_token = Some(token);
        }
    }

    pub fn token(&self) -> &str {
        self.auth_token.as_deref().unwrap_or("")
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "api_base_url" => Some(self.api_base_url.clone()),
            "auth_token" => self.auth_token.clone(),
            "request_timeout_secs" => self.request_timeout_secs.map(|v| v.to_string()),
            "projects_per_row" => Some(self.projects_per_row.to_string()),
            "tasks_this_week" => Some(match self.tasks_this_week {
                TasksThisWeekStub::Random => "random".to_string(),
                TasksThisWeekStub::Fixed(n) => n.to_string(),
            }),
            "log_level" => Some(self.log_level.clone()),
            _ => self.get_custom(key).cloned(),
        }
    }

    /// Sets a known key from its textual form. Unknown keys land in
    /// `custom_settings`.
    pub fn set_value(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let invalid = |reason: &str| ValidationError::InvalidConfigValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let mut updated = self.clone();
        match key {
            "api_base_url" => updated.api_base_url = value.to_string(),
            "auth_token" => {
                updated.auth_token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "request_timeout_secs" => {
                updated.request_timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid("expected seconds"))?)
                }
            }
            "projects_per_row" => {
                updated.projects_per_row = value.parse().map_err(|_| invalid("expected a number"))?
            }
            "tasks_this_week" => {
                updated.tasks_this_week = if value.eq_ignore_ascii_case("random") {
                    TasksThisWeekStub::Random
                } else {
                    TasksThisWeekStub::Fixed(
                        value
                            .parse()
                            .map_err(|_| invalid("expected 'random' or a number"))?,
                    )
                }
            }
            "log_level" => updated.log_level = value.to_lowercase(),
            _ => updated.set_custom(key.to_string(), value.to_string()),
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn set_custom(&mut self, key: String, value: String) {
        self.custom_settings.insert(key, value);
    }

    pub fn get_custom(&self, key: &str) -> Option<&String> {
        self.custom_settings.get(key)
    }
}
