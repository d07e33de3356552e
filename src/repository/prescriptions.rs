//! Prescriptions repository for API operations

use std::sync::Arc;

use reqwest::Method;

use super::{ApiClient, AuthProvider, PRESCRIPTIONS_PATH};
use crate::{
    error::{AppError, AppResult},
    models::{AnalyticsSummary, Page, Prescription, PrescriptionQuery},
};

#[derive(Clone)]
pub struct PrescriptionsRepository {
    api: ApiClient,
    auth: Arc<dyn AuthProvider>,
}

impl PrescriptionsRepository {
    pub fn new(api: ApiClient, auth: Arc<dyn AuthProvider>) -> Self {
        Self { api, auth }
    }

    fn path(id: i64) -> String {
        format!("{}/{}", PRESCRIPTIONS_PATH, id)
    }

    /// List one page of prescriptions, optionally filtered by prescription date
    pub async fn list(&self, query: &PrescriptionQuery) -> AppResult<Page<Prescription>> {
        let request = self
            .api
            .request(Method::GET, PRESCRIPTIONS_PATH, self.auth.auth_headers()?)
            .query(query);
        let response = self.api.send(request).await?;
        ApiClient::json(response).await
    }

    /// Get prescription by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Prescription> {
        let request = self
            .api
            .request(Method::GET, &Self::path(id), self.auth.auth_headers()?);
        let response = self.api.send(request).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!("Prescription with id {} not found", id)),
            other => other,
        })?;
        ApiClient::json(response).await
    }

    /// Create a prescription; the server assigns the id
    pub async fn create(&self, prescription: &Prescription) -> AppResult<Prescription> {
        let request = self
            .api
            .request(Method::POST, PRESCRIPTIONS_PATH, self.auth.auth_headers()?)
            .json(prescription);
        let response = self.api.send(request).await?;
        ApiClient::json(response).await
    }

    /// Replace a prescription in full
    pub async fn update(&self, id: i64, prescription: &Prescription) -> AppResult<Prescription> {
        let request = self
            .api
            .request(Method::PUT, &Self::path(id), self.auth.auth_headers()?)
            .json(prescription);
        let response = self.api.send(request).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!("Prescription with id {} not found", id)),
            other => other,
        })?;
        ApiClient::json(response).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let request = self
            .api
            .request(Method::DELETE, &Self::path(id), self.auth.auth_headers()?);
        self.api.send(request).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!("Prescription with id {} not found", id)),
            other => other,
        })?;
        Ok(())
    }

    /// Server-side analytics summary
    pub async fn analytics(&self) -> AppResult<AnalyticsSummary> {
        let path = format!("{}/analytics", PRESCRIPTIONS_PATH);
        let request = self
            .api
            .request(Method::GET, &path, self.auth.auth_headers()?);
        let response = self.api.send(request).await?;
        ApiClient::json(response).await
    }
}
