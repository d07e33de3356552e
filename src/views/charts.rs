//! Analytics / charts screen

use crate::{
    models::{AnalyticsReport, AnalyticsSummary},
    services::analytics::{AnalyticsOptions, AnalyticsService},
};

use super::{Completed, Notification, Pending, RequestTracker};

pub struct ChartsView {
    service: AnalyticsService,
    tracker: RequestTracker,
    options: AnalyticsOptions,
    report: Option<AnalyticsReport>,
    loading: bool,
}

impl ChartsView {
    pub fn new(service: AnalyticsService, options: AnalyticsOptions) -> Self {
        Self {
            service,
            tracker: RequestTracker::default(),
            options,
            report: None,
            loading: false,
        }
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        self.report.as_ref()
    }

    /// Headline numbers; zero until the first successful load
    pub fn metrics(&self) -> AnalyticsSummary {
        self.report
            .as_ref()
            .map(|r| r.summary.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn start_load(&mut self) -> Pending<AnalyticsReport> {
        let ticket = self.tracker.begin();
        self.loading = true;
        let service = self.service.clone();
        let options = self.options;
        Pending::new(ticket, async move { service.load(&options).await })
    }

    pub fn finish_load(&mut self, completed: Completed<AnalyticsReport>) -> Option<Notification> {
        if !self.tracker.is_current(completed.ticket) {
            return None;
        }
        self.loading = false;

        match completed.result {
            Ok(report) => {
                self.report = Some(report);
                None
            }
            Err(e) => Some(Notification::from_error("Error loading analytics", &e)),
        }
    }

    pub async fn load(&mut self) -> Option<Notification> {
        let pending = self.start_load();
        let completed = pending.resolve().await;
        self.finish_load(completed)
    }
}
