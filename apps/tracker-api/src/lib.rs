pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod tracker;

use std::sync::Arc;

use config::Config;
use db::store::MarkerStore;
use viewtracker_common::Identity;

pub use tracker::Tracker;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub markers: Arc<dyn MarkerStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn tracker(&self, identity: Identity) -> Tracker {
        Tracker::new(identity, self.markers.clone())
    }
}
