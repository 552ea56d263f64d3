//! Cached access to the users listing.

use crate::api::UsersApi;
use crate::users::{UserPage, get_users};
use query_cache::{QueryCache, QueryKey, QueryOptions, QueryState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const USERS_QUERY_ROOT: &str = "users";

/// How long a fetched page counts as fresh.
pub const USERS_STALE_TIME: Duration = Duration::from_secs(600);

/// `["users", page]`
pub fn users_query_key(page: u32) -> QueryKey {
    users_query_root().with(page)
}

/// Prefix shared by every page of the listing.
pub fn users_query_root() -> QueryKey {
    QueryKey::new(USERS_QUERY_ROOT)
}

/// Pages of users read through the query cache.
#[derive(Clone)]
pub struct UsersQuery {
    api: Arc<dyn UsersApi>,
    cache: QueryCache<UserPage>,
    stale_time: Duration,
}

impl UsersQuery {
    pub fn new(api: Arc<dyn UsersApi>, cache: QueryCache<UserPage>) -> Self {
        Self {
            api,
            cache,
            stale_time: USERS_STALE_TIME,
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// State of one page. Options may override the stale time; everything
    /// else they carry (enabled, callbacks) is passed through to the cache.
    pub async fn use_users(
        &self,
        page: u32,
        options: QueryOptions<UserPage>,
    ) -> QueryState<UserPage> {
        let options = options.or_stale_time(self.stale_time);
        let api = self.api.clone();
        self.cache
            .query(users_query_key(page), &options, move || async move {
                get_users(api.as_ref(), page).await
            })
            .await
    }

    /// Fresh data for a page, fetching it if needed.
    pub async fn prefetch(&self, page: u32) -> shared::Result<UserPage> {
        let api = self.api.clone();
        self.cache
            .fetch_query(users_query_key(page), Some(self.stale_time), move || async move {
                get_users(api.as_ref(), page).await
            })
            .await
    }

    pub async fn subscribe(&self, page: u32) -> watch::Receiver<QueryState<UserPage>> {
        self.cache.subscribe(&users_query_key(page)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUsersApi;
    use query_cache::{QueryCacheBuilder, QueryStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn users_query(api: &Arc<FakeUsersApi>) -> UsersQuery {
        let cache = QueryCacheBuilder::new()
            .default_stale_time(USERS_STALE_TIME)
            .build();
        UsersQuery::new(api.clone(), cache)
    }

    #[test]
    fn test_query_keys() {
        assert_eq!(users_query_key(3).to_string(), r#"["users",3]"#);
        assert!(users_query_key(3).starts_with(&users_query_root()));
    }

    #[tokio::test]
    async fn test_two_reads_within_stale_time_fetch_once() {
        let api = Arc::new(FakeUsersApi::seeded(25));
        let users = users_query(&api);

        let first = users.use_users(1, QueryOptions::new()).await;
        let second = users.use_users(1, QueryOptions::new()).await;

        assert_eq!(api.list_calls(), 1);
        assert_eq!(first.status, QueryStatus::Success);
        assert_eq!(second.data, first.data);
        let page = second.data.unwrap();
        assert_eq!(page.users.len(), 10);
        assert_eq!(page.total_count, Some(25));
    }

    #[tokio::test]
    async fn test_pages_are_cached_separately() {
        let api = Arc::new(FakeUsersApi::seeded(25));
        let users = users_query(&api);

        let third = users.use_users(3, QueryOptions::new()).await;
        users.use_users(1, QueryOptions::new()).await;

        assert_eq!(api.requested_pages(), vec![3, 1]);
        assert_eq!(third.data.unwrap().users.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_page_refetches_in_background() {
        let api = Arc::new(FakeUsersApi::seeded(5));
        let users = users_query(&api);

        users.use_users(1, QueryOptions::new()).await;
        tokio::time::advance(USERS_STALE_TIME + Duration::from_secs(1)).await;

        let mut updates = users.subscribe(1).await;
        let state = users.use_users(1, QueryOptions::new()).await;
        assert!(state.is_stale);
        assert!(state.is_fetching());
        assert_eq!(state.data.unwrap().users.len(), 5);

        updates
            .wait_for(|s| s.is_success() && !s.is_stale)
            .await
            .unwrap();
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_time_override() {
        let api = Arc::new(FakeUsersApi::seeded(5));
        let users = users_query(&api).with_stale_time(Duration::from_secs(5));

        users.prefetch(1).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        // The override is stale, the default is not.
        let state = users
            .use_users(1, QueryOptions::new().stale_time(USERS_STALE_TIME))
            .await;
        assert!(!state.is_stale);
        assert_eq!(api.list_calls(), 1);

        users.prefetch(1).await.unwrap();
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_disabled_query_does_not_fetch() {
        let api = Arc::new(FakeUsersApi::seeded(5));
        let users = users_query(&api);

        let state = users
            .use_users(1, QueryOptions::new().enabled(false))
            .await;

        assert_eq!(state.status, QueryStatus::Idle);
        assert!(state.data.is_none());
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_through_state_and_callback() {
        let api = Arc::new(FakeUsersApi::seeded(5));
        api.fail_lists(true);
        let users = users_query(&api);
        let errors = Arc::new(AtomicUsize::new(0));

        let counter = errors.clone();
        let state = users
            .use_users(
                1,
                QueryOptions::new().on_error(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await;

        assert!(state.is_error());
        assert_eq!(state.error.and_then(|e| e.status()), Some(500));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }
}
