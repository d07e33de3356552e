//! Repository layer for the remote prescription REST API

pub mod prescriptions;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Method, RequestBuilder, Response, StatusCode,
};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    services::session::LoginProbe,
};

/// Resource root of every prescription endpoint
pub const PRESCRIPTIONS_PATH: &str = "/api/prescriptions";

/// Supplies the headers attached to every authenticated request
pub trait AuthProvider: Send + Sync {
    fn auth_headers(&self) -> AppResult<HeaderMap>;
}

/// Thin HTTP client bound to one API server
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, headers: HeaderMap) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        self.http.request(method, self.url(path)).headers(headers)
    }

    /// Send a request and map every non-2xx status to an error
    pub async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!("Request to {} timed out", self.base_url);
            } else if e.is_connect() {
                tracing::warn!("Cannot reach {}", self.base_url);
            }
            AppError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} answered {}: {}", url, status, body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::Authentication(format!("{} rejected the credentials", url))
            }
            StatusCode::NOT_FOUND => AppError::NotFound(url),
            _ => AppError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }

    /// Decode a JSON body
    pub async fn json<T: serde::de::DeserializeOwned>(response: Response) -> AppResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LoginProbe for ApiClient {
    async fn probe(&self, authorization: &str) -> AppResult<()> {
        let value = HeaderValue::from_str(authorization)
            .map_err(|_| AppError::invalid("Credentials contain characters not allowed in a header"))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        self.send(self.request(Method::GET, PRESCRIPTIONS_PATH, headers))
            .await
            .map(|_| ())
    }
}

/// Main repository struct holding the API client
#[derive(Clone)]
pub struct Repository {
    pub api: ApiClient,
    pub prescriptions: prescriptions::PrescriptionsRepository,
}

impl Repository {
    /// Create a new repository sending requests through `api`
    pub fn new(api: ApiClient, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            prescriptions: prescriptions::PrescriptionsRepository::new(api.clone(), auth),
            api,
        }
    }
}
