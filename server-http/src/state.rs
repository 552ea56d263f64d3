use chrono::{TimeDelta, Utc};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use shared_http::api::{NewUser, UserWire};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Server state shared across handlers: an in-memory user list kept in
/// insertion order.
#[derive(Clone)]
pub struct AppState {
    users: Arc<RwLock<Vec<UserWire>>>,
    page_size: usize,
}

impl AppState {
    pub fn new(users: Vec<UserWire>, page_size: usize) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
            page_size: page_size.max(1),
        }
    }

    /// State seeded with `count` fake users created within the last year.
    pub fn seeded(count: usize, page_size: usize) -> Self {
        let users = (0..count).map(|_| fake_user()).collect();
        Self::new(users, page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// One 1-based page plus the total number of users.
    pub async fn page(&self, page: u32, per_page: usize) -> (Vec<UserWire>, usize) {
        let users = self.users.read().await;
        let total = users.len();
        let per_page = per_page.max(1);
        let start = (page.max(1) as usize - 1).saturating_mul(per_page);

        let slice = users
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        (slice, total)
    }

    pub async fn insert(&self, new_user: NewUser) -> UserWire {
        let user = UserWire {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            created_at: new_user.created_at,
        };

        self.users.write().await.push(user.clone());
        user
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn fake_user() -> UserWire {
    let days_ago: i64 = (0..365).fake();

    UserWire {
        id: Uuid::new_v4().to_string(),
        name: Name().fake(),
        email: SafeEmail().fake(),
        created_at: Utc::now() - TimeDelta::days(days_ago),
    }
}
