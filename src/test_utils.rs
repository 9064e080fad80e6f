use crate::api::{ApiError, ProjectsApi};
use crate::models::Project;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

type FetchResult = Result<Vec<Project>, ApiError>;

enum MockResponse {
    Projects(Vec<Project>),
    Failure(String),
    Gated(oneshot::Receiver<FetchResult>),
}

/// Scripted stand-in for the projects endpoint.
///
/// Responses registered for a specific search term win; otherwise the next
/// queued response is used; with nothing scripted the result is an empty list.
#[derive(Default)]
pub struct MockProjectsApi {
    calls: Mutex<Vec<(String, String)>>,
    by_search: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    queue: Mutex<VecDeque<MockResponse>>,
}

impl MockProjectsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_projects(&self, projects: Vec<Project>) {
        self.queue.lock().unwrap().push_back(MockResponse::Projects(projects));
    }

    pub fn push_failure(&self, body: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Failure(body.to_string()));
    }

    pub fn push_projects_for(&self, search: &str, projects: Vec<Project>) {
        self.push_for(search, MockResponse::Projects(projects));
    }

    pub fn push_failure_for(&self, search: &str, body: &str) {
        self.push_for(search, MockResponse::Failure(body.to_string()));
    }

    /// Queues a response for `search` that resolves only when the returned
    /// sender fires.
    pub fn push_gated_for(&self, search: &str) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.push_for(search, MockResponse::Gated(rx));
        tx
    }

    /// `(token, search)` pairs in the order requests reached the mock.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Yields until at least `count` requests have arrived.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn push_for(&self, search: &str, response: MockResponse) {
        self.by_search
            .lock()
            .unwrap()
            .entry(search.to_string())
            .or_default()
            .push_back(response);
    }

    fn next_response(&self, search: &str) -> Option<MockResponse> {
        let scripted = self
            .by_search
            .lock()
            .unwrap()
            .get_mut(search)
            .and_then(VecDeque::pop_front);
        scripted.or_else(|| self.queue.lock().unwrap().pop_front())
    }
}

impl ProjectsApi for MockProjectsApi {
    async fn fetch_projects(&self, token: &str, search: &str) -> FetchResult {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), search.to_string()));

        let response = self.next_response(search);
        match response {
            None => Ok(Vec::new()),
            Some(MockResponse::Projects(projects)) => Ok(projects),
            Some(MockResponse::Failure(body)) => Err(failure(body)),
            Some(MockResponse::Gated(rx)) => match rx.await {
                Ok(result) => result,
                Err(_) => Err(failure("gate dropped".to_string())),
            },
        }
    }
}

fn failure(body: String) -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body,
    }
}

/// A small mixed collection used across dashboard tests.
pub fn sample_projects() -> Vec<Project> {
    vec![
        Project::new(1, "Website relaunch")
            .with_status("active")
            .with_updated_at("2024-01-01")
            .with_end_date("2024-06-30")
            .with_progress(40.0),
        Project::new(2, "Quarterly report")
            .with_status("completed")
            .with_updated_at("2024-02-01")
            .with_progress(100.0),
        Project::new(3, "Mobile app")
            .with_status("active")
            .with_updated_at("2024-03-10")
            .with_milestones(vec![serde_json::json!({"id": 1})]),
    ]
}
