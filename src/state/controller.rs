use log::{debug, error, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::query::{QueryStore, SEARCH_PARAM};
use super::shared::SharedSubscription;
use super::view::DashboardState;
use crate::api::{ApiError, ProjectsApi};
use crate::models::{Project, TasksThisWeekStub};

/// What a fetch was issued for. A new fetch goes out whenever this changes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FetchKey {
    search: String,
    token: String,
}

#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    result: Result<Vec<Project>, ApiError>,
}

/// A mounted dashboard: owns the view state, the query store and the single
/// in-flight fetch.
///
/// Only the newest request may touch the state. Issuing a request aborts the
/// previous one and stale outcomes are dropped on arrival, so a slow early
/// response can never overwrite a later one. Dropping the controller aborts
/// whatever is still in flight.
///
/// Spawns onto the ambient tokio runtime; construct it inside one.
pub struct DashboardController<A: ProjectsApi> {
    api: Arc<A>,
    shared: SharedSubscription,
    query: Box<dyn QueryStore>,
    state: DashboardState,
    token: String,
    generation: u64,
    last_key: Option<FetchKey>,
    in_flight: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<A: ProjectsApi> DashboardController<A> {
    /// Reads the search term from the query store, the token from the shared
    /// state, and issues the first fetch.
    ///
    /// A shared search term that differs from the stored one wins, as it
    /// does on every later change. The query store is left as it is.
    pub fn mount(
        api: Arc<A>,
        shared: SharedSubscription,
        query: Box<dyn QueryStore>,
        stub: TasksThisWeekStub,
    ) -> Self {
        let mut initial_search = query.get(SEARCH_PARAM).unwrap_or_default();
        let shared_search = shared.search();
        if shared_search != initial_search {
            debug!("Shared search differs at mount, overriding query value");
            initial_search = shared_search;
        }
        let token = shared.token();
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        let mut controller = Self {
            api,
            shared,
            query,
            state: DashboardState::new(initial_search, stub),
            token,
            generation: 0,
            last_key: None,
            in_flight: None,
            outcomes_tx,
            outcomes_rx,
        };
        controller.sync_fetch();
        controller
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn query(&self) -> &dyn QueryStore {
        self.query.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Text input changed: local state first, then the query string. The
    /// fetch follows from the next [`pump`](Self::pump).
    pub fn handle_search_input(&mut self, value: String) {
        self.state.set_search_query(value.clone());
        if let Err(e) = self.query.replace(&[(SEARCH_PARAM, value.as_str())]) {
            warn!("Failed to persist search query: {:#}", e);
        }
    }

    /// Re-issues the fetch for the current search and token.
    pub fn refresh(&mut self) {
        if self.token.is_empty() {
            debug!("Refresh skipped: no auth token");
            return;
        }
        let key = self.current_key();
        self.issue_fetch(key);
    }

    /// Folds in everything that happened since the last call: shared state
    /// changes, a changed fetch key, finished fetches. Returns whether any
    /// fetch outcome was applied.
    pub fn pump(&mut self) -> bool {
        if let Some(search) = self.shared.take_search_change() {
            if search != self.state.search_query() {
                debug!("Shared search changed, overriding local query");
                self.state.set_search_query(search);
            }
        }
        if let Some(token) = self.shared.take_token_change() {
            self.token = token;
        }

        self.sync_fetch();

        let mut applied = false;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            applied |= self.apply_outcome(outcome);
        }
        applied
    }

    /// Pumps, then waits until the newest fetch has been applied.
    pub async fn settle(&mut self) {
        self.pump();
        while self.in_flight.is_some() {
            match self.outcomes_rx.recv().await {
                Some(outcome) => {
                    self.apply_outcome(outcome);
                }
                None => break,
            }
        }
    }

    fn current_key(&self) -> FetchKey {
        FetchKey {
            search: self.state.search_query().to_string(),
            token: self.token.clone(),
        }
    }

    fn sync_fetch(&mut self) {
        if self.token.is_empty() {
            self.last_key = None;
            if let Some(handle) = self.in_flight.take() {
                debug!("Auth token cleared, cancelling fetch #{}", self.generation);
                handle.abort();
                // An outcome already queued for it must not apply
                self.generation += 1;
            }
            if self.state.is_loading() {
                debug!("No auth token; not fetching projects");
                self.state.finish_loading();
            }
            return;
        }

        let key = self.current_key();
        if self.last_key.as_ref() != Some(&key) {
            self.issue_fetch(key);
        }
    }

    fn issue_fetch(&mut self, key: FetchKey) {
        if let Some(previous) = self.in_flight.take() {
            debug!("Superseding fetch #{}", self.generation);
            previous.abort();
        }

        self.generation += 1;
        let generation = self.generation;
        self.state.begin_loading();
        self.last_key = Some(key.clone());

        debug!("Fetch #{} for search {:?}", generation, key.search);
        let api = Arc::clone(&self.api);
        let tx = self.outcomes_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.fetch_projects(&key.token, &key.search).await;
            let _ = tx.send(FetchOutcome { generation, result });
        }));
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!("Discarding superseded fetch #{}", outcome.generation);
            return false;
        }

        self.in_flight = None;
        match outcome.result {
            Ok(projects) => self.state.apply_projects(projects),
            Err(e) => error!("Error fetching projects: {}", e),
        }
        self.state.finish_loading();
        true
    }
}

impl<A: ProjectsApi> Drop for DashboardController<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::query::MemoryQueryStore;
    use crate::state::shared::SharedState;
    use crate::test_utils::{sample_projects, MockProjectsApi};

    fn mount_with(
        api: &Arc<MockProjectsApi>,
        shared: &SharedState,
        query: &str,
    ) -> DashboardController<MockProjectsApi> {
        DashboardController::mount(
            Arc::clone(api),
            shared.subscribe(),
            Box::new(MemoryQueryStore::from_query(query).unwrap()),
            TasksThisWeekStub::Fixed(0),
        )
    }

    #[tokio::test]
    async fn test_mount_fetches_with_query_search_and_token() {
        let api = Arc::new(MockProjectsApi::new());
        api.push_projects(sample_projects());
        let shared = SharedState::new("tok", "web");

        let mut controller = mount_with(&api, &shared, "search=web");
        assert!(controller.state().is_loading());
        controller.settle().await;

        assert!(!controller.state().is_loading());
        assert_eq!(controller.state().search_query(), "web");
        assert_eq!(controller.state().project_list().len(), sample_projects().len());
        assert_eq!(api.calls(), vec![("tok".to_string(), "web".to_string())]);
    }

    #[tokio::test]
    async fn test_no_token_means_no_fetch() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("", "");

        let mut controller = mount_with(&api, &shared, "");
        controller.settle().await;

        assert!(api.calls().is_empty());
        assert!(!controller.state().is_loading());

        shared.set_token("late-token");
        controller.settle().await;
        assert_eq!(api.calls(), vec![("late-token".to_string(), String::new())]);
    }

    #[tokio::test]
    async fn test_search_input_updates_query_then_refetches() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let mut controller = mount_with(&api, &shared, "");
        controller.settle().await;

        controller.handle_search_input("roadmap".to_string());
        assert_eq!(controller.state().search_query(), "roadmap");
        assert_eq!(controller.query().get(SEARCH_PARAM).as_deref(), Some("roadmap"));
        assert_eq!(api.calls().len(), 1);

        controller.settle().await;
        assert_eq!(api.calls().last().unwrap().1, "roadmap");
    }

    #[tokio::test]
    async fn test_unchanged_key_does_not_refetch() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "a");
        let mut controller = mount_with(&api, &shared, "search=a");
        controller.settle().await;

        controller.handle_search_input("a".to_string());
        controller.settle().await;
        controller.pump();
        assert_eq!(api.calls().len(), 1);

        controller.refresh();
        controller.settle().await;
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_shared_search_overrides_local_edit() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "");
        let mut controller = mount_with(&api, &shared, "");
        controller.settle().await;

        controller.state_mut().set_search_query("half-typed".to_string());
        shared.set_search("global term");
        controller.pump();

        assert_eq!(controller.state().search_query(), "global term");
        controller.settle().await;
        assert_eq!(api.calls().last().unwrap().1, "global term");
    }

    #[tokio::test]
    async fn test_shared_search_wins_at_mount() {
        let api = Arc::new(MockProjectsApi::new());
        let shared = SharedState::new("tok", "global");

        let mut controller = mount_with(&api, &shared, "search=web");
        assert_eq!(controller.state().search_query(), "global");
        controller.settle().await;

        assert_eq!(api.calls(), vec![("tok".to_string(), "global".to_string())]);
        assert_eq!(controller.query().get(SEARCH_PARAM).as_deref(), Some("web"));
    }

    #[tokio::test]
    async fn test_clearing_token_cancels_in_flight_fetch() {
        let api = Arc::new(MockProjectsApi::new());
        let gate = api.push_gated_for("");
        let shared = SharedState::new("tok", "");

        let mut controller = mount_with(&api, &shared, "");
        api.wait_for_calls(1).await;
        assert!(controller.is_fetching());

        shared.set_token("");
        controller.pump();
        assert!(!controller.is_fetching());
        assert!(!controller.state().is_loading());

        // Whatever the revoked request would have returned is never applied
        let _ = gate.send(Ok(sample_projects()));
        tokio::task::yield_now().await;
        controller.pump();
        assert!(controller.state().project_list().is_empty());
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_queued_outcome_of_cancelled_fetch_is_dropped() {
        let api = Arc::new(MockProjectsApi::new());
        let _gate = api.push_gated_for("");
        let shared = SharedState::new("tok", "");

        let mut controller = mount_with(&api, &shared, "");
        let issued = controller.generation;
        shared.set_token("");
        controller.pump();

        let applied = controller.apply_outcome(FetchOutcome {
            generation: issued,
            result: Ok(sample_projects()),
        });
        assert!(!applied);
        assert!(controller.state().project_list().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let api = Arc::new(MockProjectsApi::new());
        api.push_projects(sample_projects());
        api.push_failure("boom");
        let shared = SharedState::new("tok", "");
        let mut controller = mount_with(&api, &shared, "");
        controller.settle().await;
        let before = controller.state().project_list().to_vec();
        let stats_before = *controller.state().stats();

        controller.refresh();
        assert!(controller.state().is_loading());
        controller.settle().await;

        assert_eq!(controller.state().project_list(), before.as_slice());
        assert_eq!(*controller.state().stats(), stats_before);
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn test_superseded_response_is_never_applied() {
        let api = Arc::new(MockProjectsApi::new());
        let slow = api.push_gated_for("");
        api.push_projects_for("fresh", vec![Project::new(99, "Fresh")]);
        let shared = SharedState::new("tok", "");

        let mut controller = mount_with(&api, &shared, "");
        api.wait_for_calls(1).await;
        controller.handle_search_input("fresh".to_string());
        controller.settle().await;

        // The first request was aborted; releasing it changes nothing
        let _ = slow.send(Ok(sample_projects()));
        tokio::task::yield_now().await;
        controller.pump();

        let titles: Vec<&str> = controller
            .state()
            .project_list()
            .iter()
            .map(|p| p.display_title())
            .collect();
        assert_eq!(titles, vec!["Fresh"]);
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn test_stale_generation_is_discarded() {
        let api = Arc::new(MockProjectsApi::new());
        let _gate = api.push_gated_for("");
        let shared = SharedState::new("tok", "");

        let mut controller = mount_with(&api, &shared, "");
        controller.refresh();

        let applied = controller.apply_outcome(FetchOutcome {
            generation: 1,
            result: Ok(sample_projects()),
        });
        assert!(!applied);
        assert!(controller.state().project_list().is_empty());
        assert!(controller.state().is_loading());
        assert!(controller.is_fetching());
    }

    #[tokio::test]
    async fn test_drop_aborts_in_flight_fetch() {
        let api = Arc::new(MockProjectsApi::new());
        let gate = api.push_gated_for("");
        let shared = SharedState::new("tok", "");

        let controller = mount_with(&api, &shared, "");
        api.wait_for_calls(1).await;
        assert!(controller.is_fetching());
        drop(controller);

        for _ in 0..100 {
            if gate.is_closed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(gate.is_closed());
    }
}
