use anyhow::Result;
use reqwest::Url;

/// Custom error types for better error handling
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("API base URL is invalid: {reason}")]
    InvalidBaseUrl { reason: String },

    #[error("Log level is invalid: {reason}")]
    InvalidLogLevel { reason: String },

    #[error("Numeric value is invalid: {field} - {reason}")]
    InvalidNumeric { field: String, reason: String },

    #[error("Configuration value is invalid: {key} - {reason}")]
    InvalidConfigValue { key: String, reason: String },
}

pub const VALID_LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Checks that the base URL is an absolute http(s) URL and returns it without
/// a trailing slash, ready for `{base}/api/...` joins.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::InvalidBaseUrl {
            reason: "URL cannot be empty".to_string(),
        }
        .into());
    }

    let url = Url::parse(trimmed).map_err(|e| ValidationError::InvalidBaseUrl {
        reason: format!("'{}' is not an absolute URL ({})", trimmed, e),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidBaseUrl {
            reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        }
        .into());
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidBaseUrl {
            reason: "URL has no host".to_string(),
        }
        .into());
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::InvalidBaseUrl {
            reason: "URL must not carry a query or fragment".to_string(),
        }
        .into());
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

pub fn validate_log_level(level: &str) -> Result<()> {
    if !VALID_LOG_LEVELS.contains(&level) {
        return Err(ValidationError::InvalidLogLevel {
            reason: format!(
                "'{}' is not one of: {}",
                level,
                VALID_LOG_LEVELS.join(", ")
            ),
        }
        .into());
    }
    Ok(())
}

pub fn validate_projects_per_row(per_row: usize) -> Result<usize> {
    if per_row == 0 || per_row > 6 {
        return Err(ValidationError::InvalidNumeric {
            field: "projects_per_row".to_string(),
            reason: format!("must be between 1 and 6, got {}", per_row),
        }
        .into());
    }
    Ok(per_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("http://localhost:3000").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            validate_base_url("  https://pm.example.com/  ").unwrap(),
            "https://pm.example.com"
        );
        assert_eq!(
            validate_base_url("https://example.com/backend/").unwrap(),
            "https://example.com/backend"
        );

        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("localhost:3000/api").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("http://example.com?x=1").is_err());
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("trace").is_ok());

        assert!(validate_log_level("INFO").is_err());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_validate_projects_per_row() {
        assert_eq!(validate_projects_per_row(3).unwrap(), 3);

        assert!(validate_projects_per_row(0).is_err());
        assert!(validate_projects_per_row(7).is_err());
    }
}
