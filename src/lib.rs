pub mod api;
pub mod cli;
pub mod models;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod ui;
pub mod utils;

pub use models::{Config, FilterCategory, Project};
