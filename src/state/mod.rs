pub mod controller;
pub mod query;
pub mod shared;
pub mod view;

pub use controller::DashboardController;
pub use query::{FileQueryStore, MemoryQueryStore, QueryStore, SEARCH_PARAM};
pub use shared::{SharedState, SharedSubscription};
pub use view::DashboardState;
