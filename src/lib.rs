//! Prescription Console
//!
//! A Rust client for the prescription management REST API: HTTP Basic
//! sessions, typed CRUD over `/api/prescriptions`, chart aggregation, and the
//! headless screen controllers driven by the `prescription-console` binary.

use std::sync::Arc;

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by every command
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
