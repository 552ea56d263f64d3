//! Test doubles for the ports.

use crate::api::{UsersApi, UsersPageResponse};
use crate::navigation::{Navigator, Route};
use crate::sign_in::{Authenticator, Session};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::{Error, Result};
use shared_http::api::{CreateUserRequest, UserWire};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn wire_user(id: &str, name: &str, email: &str, created_at: &str) -> UserWire {
    UserWire {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        created_at: created_at.parse().expect("valid RFC 3339 timestamp"),
    }
}

/// In-memory users API with call counters and switchable failures.
pub struct FakeUsersApi {
    users: RwLock<Vec<UserWire>>,
    per_page: usize,
    total_header: RwLock<Option<Option<String>>>,
    requested_pages: RwLock<Vec<u32>>,
    created: RwLock<Vec<CreateUserRequest>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_lists: AtomicBool,
    fail_creates: AtomicBool,
}

impl FakeUsersApi {
    pub fn with_users(users: Vec<UserWire>) -> Self {
        Self {
            users: RwLock::new(users),
            per_page: 10,
            total_header: RwLock::new(None),
            requested_pages: RwLock::new(Vec::new()),
            created: RwLock::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            fail_lists: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
        }
    }

    pub fn seeded(count: usize) -> Self {
        let users = (1..=count)
            .map(|i| {
                wire_user(
                    &i.to_string(),
                    &format!("User {}", i),
                    &format!("user{}@example.com", i),
                    "2022-03-05T00:00:00Z",
                )
            })
            .collect();
        Self::with_users(users)
    }

    /// Override the `x-total-count` header; `None` drops it entirely.
    pub fn set_total_header(&self, value: Option<&str>) {
        *self.total_header.write() = Some(value.map(str::to_string));
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.read().clone()
    }

    pub fn created(&self) -> Vec<CreateUserRequest> {
        self.created.read().clone()
    }
}

#[async_trait]
impl UsersApi for FakeUsersApi {
    async fn list_users(&self, page: u32) -> Result<UsersPageResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pages.write().push(page);

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Error::request_failed(Some(500), "Internal Server Error"));
        }

        let users = self.users.read();
        let start = (page.max(1) as usize - 1) * self.per_page;
        let page_users = users.iter().skip(start).take(self.per_page).cloned().collect();
        let total_count = match self.total_header.read().clone() {
            Some(header) => header,
            None => Some(users.len().to_string()),
        };

        Ok(UsersPageResponse {
            users: page_users,
            total_count,
        })
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserWire> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(Error::request_failed(None, "connection reset by peer"));
        }

        self.created.write().push(request.clone());

        let mut users = self.users.write();
        let user = UserWire {
            id: (users.len() + 1).to_string(),
            name: request.user.name.clone(),
            email: request.user.email.clone(),
            created_at: request.user.created_at,
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Records pushed routes.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: RwLock<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.read().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: Route) {
        self.routes.write().push(route);
    }
}

/// Accepts exactly one e-mail/password pair.
pub struct StaticAuthenticator {
    email: String,
    password: String,
    calls: AtomicUsize,
}

impl StaticAuthenticator {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if email == self.email && password == self.password {
            Ok(Session {
                email: email.to_string(),
            })
        } else {
            Err(Error::request_failed(Some(401), "invalid credentials"))
        }
    }
}
