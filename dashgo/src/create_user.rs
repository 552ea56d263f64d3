use crate::api::UsersApi;
use crate::error::{DashboardError, Result};
use crate::forms::CreateUserForm;
use crate::hooks::users_query_root;
use crate::navigation::{Navigator, Route};
use crate::users::{User, UserPage};
use chrono::Utc;
use query_cache::QueryCache;
use shared_http::api::{CreateUserRequest, NewUser};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submission of the "create user" form.
///
/// A valid form is posted once. On success every cached users page is
/// invalidated and the navigator moves to the listing; on failure the cache
/// and the current page are left alone.
pub struct CreateUserFlow {
    api: Arc<dyn UsersApi>,
    cache: QueryCache<UserPage>,
    navigator: Arc<dyn Navigator>,
}

impl CreateUserFlow {
    pub fn new(
        api: Arc<dyn UsersApi>,
        cache: QueryCache<UserPage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            cache,
            navigator,
        }
    }

    pub async fn submit(&self, form: &CreateUserForm) -> Result<User> {
        if let Err(errors) = form.validate() {
            debug!(?errors, "Create user form rejected");
            return Err(errors.into());
        }

        let request = CreateUserRequest {
            user: NewUser {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
                password_confirmation: form.password_confirmation.clone(),
                created_at: Utc::now(),
            },
        };

        let created = self.api.create_user(&request).await.map_err(|e| {
            warn!(email = %request.user.email, "Failed to create user: {}", e);
            DashboardError::SubmissionFailed(e)
        })?;

        let invalidated = self.cache.invalidate_queries(&users_query_root()).await;
        info!(
            id = %created.id,
            invalidated,
            "User created, users listing invalidated"
        );

        self.navigator.push(Route::Users);
        Ok(User::from(created))
    }
}
