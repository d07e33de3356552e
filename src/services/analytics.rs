//! Analytics service: server summary first, client-side bucketing as fallback

use std::sync::Arc;

use crate::{
    config::{AnalyticsConfig, AnalyticsSource},
    error::{AppError, AppResult},
    models::{dates::Clock, AnalyticsReport, PrescriptionQuery, ReportSource},
    repository::prescriptions::PrescriptionsRepository,
};

use super::{aggregation, session::SessionManager};

/// Longest daily chart window accepted
pub const MAX_DAILY_WINDOW_DAYS: u32 = 366;
/// Longest monthly chart window accepted
pub const MAX_MONTHLY_WINDOW_MONTHS: u32 = 120;

/// Parameters of one analytics load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsOptions {
    pub daily_window_days: u32,
    pub monthly_window_months: u32,
    pub source: AnalyticsSource,
    pub client_fetch_size: u32,
}

impl From<&AnalyticsConfig> for AnalyticsOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            daily_window_days: config.daily_window_days,
            monthly_window_months: config.monthly_window_months,
            source: config.source,
            client_fetch_size: config.client_fetch_size,
        }
    }
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self::from(&AnalyticsConfig::default())
    }
}

impl AnalyticsOptions {
    /// Reject windows the chart buckets cannot be built for
    pub fn check(&self) -> AppResult<()> {
        let mut messages = Vec::new();
        if !(1..=MAX_DAILY_WINDOW_DAYS).contains(&self.daily_window_days) {
            messages.push(format!(
                "Daily window must be between 1 and {} days",
                MAX_DAILY_WINDOW_DAYS
            ));
        }
        if !(1..=MAX_MONTHLY_WINDOW_MONTHS).contains(&self.monthly_window_months) {
            messages.push(format!(
                "Monthly window must be between 1 and {} months",
                MAX_MONTHLY_WINDOW_MONTHS
            ));
        }
        if self.client_fetch_size == 0 {
            messages.push("Client fetch size must be at least 1".to_string());
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages))
        }
    }
}

/// Statuses a server without the analytics route answers with.
///
/// Spring routes `/analytics` to `/{id}` and fails the numeric conversion
/// with 400 when no dedicated mapping exists.
fn is_missing_endpoint(error: &AppError) -> bool {
    matches!(
        error,
        AppError::NotFound(_) | AppError::Http { status: 400 | 405 | 501, .. }
    )
}

#[derive(Clone)]
pub struct AnalyticsService {
    repository: PrescriptionsRepository,
    session: SessionManager,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    pub fn new(
        repository: PrescriptionsRepository,
        session: SessionManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            session,
            clock,
        }
    }

    /// Build the chart report.
    ///
    /// With `AnalyticsSource::Server` the server summary is authoritative and
    /// records are only fetched when the analytics endpoint does not exist.
    pub async fn load(&self, options: &AnalyticsOptions) -> AppResult<AnalyticsReport> {
        options.check()?;
        if !self.session.is_logged_in() {
            return Err(AppError::NotLoggedIn);
        }
        let today = self.clock.today();

        if options.source == AnalyticsSource::Server {
            match self.repository.analytics().await {
                Ok(summary) => {
                    tracing::debug!(
                        "Using server analytics summary ({} prescriptions)",
                        summary.total_prescriptions
                    );
                    let buckets = aggregation::daily_buckets_from_summary(
                        &summary,
                        today,
                        options.daily_window_days,
                    );
                    return Ok(AnalyticsReport {
                        source: ReportSource::ServerSummary,
                        daily: aggregation::daily_chart(&buckets),
                        summary,
                        gender: None,
                        age: None,
                        monthly: None,
                    });
                }
                Err(e) if is_missing_endpoint(&e) => {
                    tracing::info!("Analytics endpoint unavailable ({}), aggregating client-side", e);
                }
                Err(e) => return Err(e),
            }
        }

        self.aggregate_locally(options, today).await
    }

    async fn aggregate_locally(
        &self,
        options: &AnalyticsOptions,
        today: chrono::NaiveDate,
    ) -> AppResult<AnalyticsReport> {
        let query = PrescriptionQuery::new(0, options.client_fetch_size);
        let page = self.repository.list(&query).await?;
        let records = page.content;
        if page.total_elements > records.len() as u64 {
            tracing::warn!(
                "Aggregating {} of {} prescriptions; raise analytics.client_fetch_size to include all",
                records.len(),
                page.total_elements
            );
        }

        let summary = aggregation::summarize(&records, today, options.daily_window_days);
        Ok(AnalyticsReport {
            source: ReportSource::ClientAggregation,
            daily: aggregation::daily_distribution(&records, today, options.daily_window_days),
            gender: Some(aggregation::gender_distribution(&records)),
            age: Some(aggregation::age_distribution(&records)),
            monthly: Some(aggregation::monthly_distribution(
                &records,
                today,
                options.monthly_window_months,
            )),
            summary,
        })
    }
}
