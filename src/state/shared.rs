use tokio::sync::watch;

/// Owner side of the state the dashboard reads but never writes: the auth
/// token and the application-wide search term.
#[derive(Debug)]
pub struct SharedState {
    token: watch::Sender<String>,
    search: watch::Sender<String>,
}

impl SharedState {
    pub fn new(token: impl Into<String>, search: impl Into<String>) -> Self {
        let (token, _) = watch::channel(token.into());
        let (search, _) = watch::channel(search.into());
        Self { token, search }
    }

    pub fn subscribe(&self) -> SharedSubscription {
        SharedSubscription {
            token: self.token.subscribe(),
            search: self.search.subscribe(),
        }
    }

    /// Publishes a new token. Subscribers are only notified on a real change.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.token.send_if_modified(|current| replace_if_different(current, token));
    }

    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.search.send_if_modified(|current| replace_if_different(current, search));
    }

    pub fn token(&self) -> String {
        self.token.borrow().clone()
    }

    pub fn search(&self) -> String {
        self.search.borrow().clone()
    }
}

fn replace_if_different(current: &mut String, next: String) -> bool {
    if *current == next {
        return false;
    }
    *current = next;
    true
}

/// Read side handed to a dashboard at mount.
#[derive(Debug, Clone)]
pub struct SharedSubscription {
    token: watch::Receiver<String>,
    search: watch::Receiver<String>,
}

impl SharedSubscription {
    pub fn token(&self) -> String {
        self.token.borrow().clone()
    }

    pub fn search(&self) -> String {
        self.search.borrow().clone()
    }

    /// The new token if it changed since the last call.
    pub fn take_token_change(&mut self) -> Option<String> {
        take_change(&mut self.token)
    }

    /// The new shared search term if it changed since the last call.
    pub fn take_search_change(&mut self) -> Option<String> {
        take_change(&mut self.search)
    }
}

fn take_change(rx: &mut watch::Receiver<String>) -> Option<String> {
    match rx.has_changed() {
        Ok(true) => Some(rx.borrow_and_update().clone()),
        _ => None,
    }
}
