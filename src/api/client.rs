use anyhow::Result;
use log::debug;
use reqwest::{Client, Request};
use std::time::Duration;

use super::{ApiError, ProjectsApi};
use crate::models::{Config, Project};
use crate::utils::validation::validate_base_url;

pub const PROJECTS_PATH: &str = "/api/projects";

#[derive(Debug, Clone)]
pub struct HttpProjectsApi {
    client: Client,
    base_url: String,
}

impl HttpProjectsApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = validate_base_url(base_url)?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn projects_url(&self) -> String {
        format!("{}{}", self.base_url, PROJECTS_PATH)
    }

    /// The exact request the dashboard sends, without sending it.
    pub fn build_request(&self, token: &str, search: &str) -> Result<Request, ApiError> {
        let request = self
            .client
            .get(self.projects_url())
            .bearer_auth(token)
            .query(&[("archived", "0"), ("search", search)])
            .build()?;
        Ok(request)
    }
}

impl ProjectsApi for HttpProjectsApi {
    async fn fetch_projects(&self, token: &str, search: &str) -> Result<Vec<Project>, ApiError> {
        let request = self.build_request(token, search)?;
        debug!("GET {}", request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let projects: Vec<Project> = serde_json::from_slice(&body)?;
        debug!("Fetched {} projects", projects.len());
        Ok(projects)
    }
}
