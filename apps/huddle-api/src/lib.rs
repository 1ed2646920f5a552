pub mod config;
pub mod error;
pub mod models;
pub mod relay;
pub mod routes;
pub mod store;

use std::sync::Arc;

use config::Config;
use relay::fanout::RelayHub;
use store::ProjectStore;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayHub>,
    pub projects: Arc<ProjectStore>,
    pub config: Arc<Config>,
}
