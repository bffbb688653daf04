//! Book lending server
//!
//! Users browse books, borrow an available one and return it later, over a
//! REST JSON API. A book is borrowed while it has an open borrowing; the
//! store guarantees at most one open borrowing per book.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.auth, config.lending);
        Self {
            services: Arc::new(services),
        }
    }
}
