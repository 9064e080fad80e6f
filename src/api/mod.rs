pub mod client;

pub use client::HttpProjectsApi;

use crate::models::Project;
use std::future::Future;

/// Everything that can go wrong while fetching projects. The dashboard treats
/// all variants as one "fetch failed" outcome.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response is not a project list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to the backend's project collection.
pub trait ProjectsApi: Send + Sync + 'static {
    /// `GET /api/projects` for non-archived projects matching `search`.
    fn fetch_projects(
        &self,
        token: &str,
        search: &str,
    ) -> impl Future<Output = Result<Vec<Project>, ApiError>> + Send;
}
