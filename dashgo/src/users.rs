use crate::api::UsersApi;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::Result;
use shared_http::api::UserWire;
use tracing::warn;

/// A user ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// e.g. `March 5, 2022`
    pub created_at: String,
}

impl From<UserWire> for User {
    fn from(user: UserWire) -> Self {
        Self {
            created_at: format_display_date(&user.created_at),
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// One page of users. `total_count` is `None` when the server did not send a
/// usable `x-total-count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<User>,
    pub total_count: Option<u64>,
}

impl UserPage {
    /// Number of pages for the given page size, when the total is known.
    pub fn page_count(&self, per_page: u32) -> Option<u64> {
        if per_page == 0 {
            return None;
        }
        self.total_count
            .map(|total| total.div_ceil(u64::from(per_page)))
    }
}

/// Long month, unpadded day, four digit year, in UTC.
pub fn format_display_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y").to_string()
}

pub fn parse_total_count(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse().ok()
}

/// Fetch one 1-based page and reshape it for display, keeping server order.
pub async fn get_users(api: &dyn UsersApi, page: u32) -> Result<UserPage> {
    let response = api.list_users(page).await?;

    let total_count = parse_total_count(response.total_count.as_deref());
    if total_count.is_none() {
        warn!(
            page,
            header = ?response.total_count,
            "Missing or malformed x-total-count, total is unknown"
        );
    }

    let users = response.users.into_iter().map(User::from).collect();

    Ok(UserPage { users, total_count })
}
