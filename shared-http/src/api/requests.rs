use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query string of `GET /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
}

fn default_page() -> u32 {
    1
}

impl Default for ListUsersParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

/// Request body for `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user: NewUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Attached by the client at submission time.
    pub created_at: DateTime<Utc>,
}
