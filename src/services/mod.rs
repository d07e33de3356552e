//! Business logic services

pub mod aggregation;
pub mod analytics;
pub mod prescriptions;
pub mod session;
pub mod storage;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppResult,
    models::dates::{Clock, SystemClock},
    repository::{ApiClient, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub session: session::SessionManager,
    pub prescriptions: prescriptions::PrescriptionService,
    pub analytics: analytics::AnalyticsService,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Wire every service around one API client and one credential store
    pub fn new(
        api: ApiClient,
        store: Arc<dyn storage::KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = session::SessionManager::new(store, Arc::new(api.clone()));
        let repository = Repository::new(api, Arc::new(session.clone()));

        Self {
            prescriptions: prescriptions::PrescriptionService::new(
                repository.prescriptions.clone(),
                session.clone(),
            ),
            analytics: analytics::AnalyticsService::new(
                repository.prescriptions,
                session.clone(),
                clock.clone(),
            ),
            session,
            clock,
        }
    }

    /// Services backed by the configured API server and session file
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api = ApiClient::new(&config.api)?;
        let store = Arc::new(storage::FileStore::new(&config.session.store_path));
        Ok(Self::new(api, store, Arc::new(SystemClock)))
    }
}
