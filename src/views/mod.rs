//! Headless screen controllers.
//!
//! Each view owns the state its screen displays and turns service results into
//! user-facing notifications. A failed action leaves the previous state intact.
//!
//! Loads are split into `start_*` (takes a ticket, returns an owned future) and
//! `finish_*` (applies the result). Only the most recent ticket may apply its
//! result, so a slow response can never overwrite a newer one.

pub mod charts;
pub mod form;
pub mod list;
pub mod login;

use std::future::Future;
use std::pin::Pin;

use crate::error::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub code: ErrorCode,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            code: ErrorCode::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            code: ErrorCode::Failure,
        }
    }

    /// Generic failure message for `action`; server detail is only logged
    pub fn from_error(action_failed: &str, error: &AppError) -> Self {
        tracing::warn!("{}: {}", action_failed, error);
        let note = match error {
            AppError::NotLoggedIn => Self::error("Please log in to continue"),
            AppError::Validation(messages) => Self::error(messages.join("; ")),
            _ => Self::error(action_failed),
        };
        note.with_code(error.code())
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out tickets; only the latest one is current
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Make every outstanding ticket stale, e.g. when leaving the screen
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

type BoxedRequest<T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'static>>;

/// An issued request that has not completed yet
pub struct Pending<T> {
    ticket: Ticket,
    request: BoxedRequest<T>,
}

impl<T> Pending<T> {
    pub fn new<F>(ticket: Ticket, request: F) -> Self
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        Self {
            ticket,
            request: Box::pin(request),
        }
    }

    pub async fn resolve(self) -> Completed<T> {
        Completed {
            ticket: self.ticket,
            result: self.request.await,
        }
    }
}

/// A finished request waiting to be applied to its view
pub struct Completed<T> {
    pub ticket: Ticket,
    pub result: AppResult<T>,
}
