use crate::api::{ApiClient, UsersApi};
use crate::create_user::CreateUserFlow;
use crate::hooks::UsersQuery;
use crate::navigation::Navigator;
use crate::sign_in::{Authenticator, SignInFlow};
use crate::users::UserPage;
use query_cache::{QueryCache, QueryCacheBuilder};
use shared::config::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Root of the dashboard: one API client, one query cache and one navigator
/// shared by the listing and every flow.
#[derive(Clone)]
pub struct Dashboard {
    api: Arc<dyn UsersApi>,
    cache: QueryCache<UserPage>,
    navigator: Arc<dyn Navigator>,
    users_stale_time: Duration,
}

impl Dashboard {
    /// Talk to the API at `config.api_base_url`.
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> shared::Result<Self> {
        let client = ApiClient::new(config)?;
        info!(base_url = %client.base_url(), "Dashboard API client ready");
        Ok(Self::with_api(Arc::new(client), navigator, config))
    }

    pub fn with_api(
        api: Arc<dyn UsersApi>,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        let mut builder = QueryCacheBuilder::new()
            .name("users")
            .default_stale_time(config.users_stale_time)
            .gc_time(config.query_gc_time);
        if let Some(capacity) = config.query_cache_capacity {
            builder = builder.max_entries(capacity);
        }

        Self {
            api,
            cache: builder.build(),
            navigator,
            users_stale_time: config.users_stale_time,
        }
    }

    pub fn users(&self) -> UsersQuery {
        UsersQuery::new(self.api.clone(), self.cache.clone()).with_stale_time(self.users_stale_time)
    }

    pub fn create_user_flow(&self) -> CreateUserFlow {
        CreateUserFlow::new(self.api.clone(), self.cache.clone(), self.navigator.clone())
    }

    pub fn sign_in_flow(&self, authenticator: Arc<dyn Authenticator>) -> SignInFlow {
        SignInFlow::new(authenticator, self.navigator.clone())
    }

    pub fn query_cache(&self) -> &QueryCache<UserPage> {
        &self.cache
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{CreateUserForm, SignInForm};
    use crate::navigation::{HistoryNavigator, Route};
    use crate::testing::{FakeUsersApi, StaticAuthenticator};
    use query_cache::QueryOptions;

    #[test]
    fn test_from_config_rejects_bad_url() {
        let navigator = Arc::new(HistoryNavigator::new());
        let result = Dashboard::from_config(&ClientConfig::with_base_url("ftp://nope"), navigator);
        assert!(matches!(result, Err(shared::Error::Config(_))));
    }

    #[tokio::test]
    async fn test_flows_share_cache_and_navigator() {
        let api = Arc::new(FakeUsersApi::seeded(12));
        let navigator = Arc::new(HistoryNavigator::new());
        let dashboard = Dashboard::with_api(api.clone(), navigator.clone(), &ClientConfig::default());

        dashboard
            .sign_in_flow(Arc::new(StaticAuthenticator::new("admin@dashgo.dev", "123456")))
            .submit(&SignInForm {
                email: "admin@dashgo.dev".into(),
                password: "123456".into(),
            })
            .await
            .unwrap();
        assert_eq!(navigator.current(), Route::Dashboard);

        let users = dashboard.users();
        let page = users.use_users(2, QueryOptions::new()).await;
        assert_eq!(page.data.unwrap().users.len(), 2);

        dashboard
            .create_user_flow()
            .submit(&CreateUserForm {
                name: "Linus".into(),
                email: "linus@example.com".into(),
                password: "kernel-hacker".into(),
                password_confirmation: "kernel-hacker".into(),
            })
            .await
            .unwrap();

        assert_eq!(navigator.current(), Route::Users);
        let stale = users.use_users(2, QueryOptions::new().enabled(false)).await;
        assert!(stale.is_stale);

        let refreshed = users.prefetch(2).await.unwrap();
        assert_eq!(refreshed.users.len(), 3);
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_short_gc_time_keeps_fresh_pages() {
        let api = Arc::new(FakeUsersApi::seeded(3));
        let config = ClientConfig {
            users_stale_time: Duration::from_millis(800),
            query_gc_time: Duration::from_millis(100),
            ..ClientConfig::default()
        };
        let dashboard = Dashboard::with_api(api.clone(), Arc::new(HistoryNavigator::new()), &config);
        let users = dashboard.users();

        users.use_users(1, QueryOptions::new()).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = users.use_users(1, QueryOptions::new()).await;

        assert_eq!(api.list_calls(), 1);
        assert!(!second.is_stale);
        assert_eq!(second.data.unwrap().users.len(), 3);
    }
}
