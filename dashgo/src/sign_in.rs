//! Sign-in submission.

use crate::error::{DashboardError, Result};
use crate::forms::SignInForm;
use crate::navigation::{Navigator, Route};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
}

/// Checks credentials. The dashboard ships no implementation of its own.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> shared::Result<Session>;
}

pub struct SignInFlow {
    authenticator: Arc<dyn Authenticator>,
    navigator: Arc<dyn Navigator>,
}

impl SignInFlow {
    pub fn new(authenticator: Arc<dyn Authenticator>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            authenticator,
            navigator,
        }
    }

    /// Validate, authenticate, then go to the dashboard. Nothing is sent for
    /// an invalid form and nothing navigates on failure.
    pub async fn submit(&self, form: &SignInForm) -> Result<Session> {
        form.validate()?;

        let email = form.email.trim();
        let session = self
            .authenticator
            .authenticate(email, &form.password)
            .await
            .map_err(|e| {
                warn!(email, "Sign-in rejected: {}", e);
                DashboardError::AuthenticationFailed(e)
            })?;

        info!(email = %session.email, "Signed in");
        self.navigator.push(Route::Dashboard);
        Ok(session)
    }
}
