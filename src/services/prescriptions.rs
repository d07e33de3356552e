//! Prescription management service

use crate::{
    error::{AppError, AppResult},
    models::{Page, Prescription, PrescriptionForm, PrescriptionQuery},
    repository::prescriptions::PrescriptionsRepository,
};

use super::session::SessionManager;

#[derive(Clone)]
pub struct PrescriptionService {
    repository: PrescriptionsRepository,
    session: SessionManager,
}

impl PrescriptionService {
    pub fn new(repository: PrescriptionsRepository, session: SessionManager) -> Self {
        Self { repository, session }
    }

    /// Every operation needs a stored credential
    fn require_session(&self) -> AppResult<()> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(AppError::NotLoggedIn)
        }
    }

    /// List prescriptions for one page and an optional date range
    pub async fn list(&self, query: &PrescriptionQuery) -> AppResult<Page<Prescription>> {
        self.require_session()?;
        query.check()?;
        let page = self.repository.list(query).await?;
        tracing::debug!(
            "Loaded page {} ({} of {} prescriptions)",
            page.number,
            page.content.len(),
            page.total_elements
        );
        Ok(page)
    }

    pub async fn get(&self, id: i64) -> AppResult<Prescription> {
        self.require_session()?;
        self.repository.get_by_id(id).await
    }

    /// Validate the form and create a new prescription
    pub async fn create(&self, form: &PrescriptionForm) -> AppResult<Prescription> {
        let prescription = form.to_prescription(None)?;
        self.require_session()?;
        let created = self.repository.create(&prescription).await?;
        tracing::info!("Created prescription id={:?}", created.id);
        Ok(created)
    }

    /// Validate the form and replace prescription `id` with it
    pub async fn update(&self, id: i64, form: &PrescriptionForm) -> AppResult<Prescription> {
        let prescription = form.to_prescription(Some(id))?;
        self.require_session()?;
        let updated = self.repository.update(id, &prescription).await?;
        tracing::info!("Updated prescription id={}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.require_session()?;
        self.repository.delete(id).await?;
        tracing::info!("Deleted prescription id={}", id);
        Ok(())
    }
}
