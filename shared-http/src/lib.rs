//! Wire types shared by the dashboard client and the development API server.

pub mod api;

/// Response header carrying the total number of users across all pages.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
