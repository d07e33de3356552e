//! Login screen

use crate::{
    error::{AppError, ErrorCode},
    services::session::SessionManager,
};

use super::Notification;

pub struct LoginView {
    session: SessionManager,
    loading: bool,
}

impl LoginView {
    pub fn new(session: SessionManager) -> Self {
        Self {
            session,
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub async fn submit(&mut self, username: &str, password: &str) -> Notification {
        self.loading = true;
        let result = self.session.login(username, password).await;
        self.loading = false;

        match result {
            Ok(credentials) => Notification::success(format!("Logged in as {}", credentials.username)),
            Err(AppError::Authentication(_)) => {
                Notification::error("Invalid username or password").with_code(ErrorCode::NotAuthorized)
            }
            Err(e) => Notification::from_error("Login failed", &e),
        }
    }

    pub fn logout(&mut self) -> Notification {
        match self.session.logout() {
            Ok(()) => Notification::success("Logged out"),
            Err(e) => Notification::from_error("Logged out, but the stored session could not be removed", &e),
        }
    }
}
