//! dashgo dashboard core
//!
//! Everything the dashboard does that is not rendering:
//!
//! - **Users API**: `GET /users?page=` and `POST /users` behind the [`UsersApi`] port
//! - **User listing**: pages normalized for display and cached per page
//! - **Forms**: create-user and sign-in validation with per-field errors
//! - **Flows**: create-user submission (invalidates the listing) and sign-in
//!
//! The [`Dashboard`] root owns the API client, the query cache and the
//! navigator, and hands them to the hook and the flows.

pub mod api;
pub mod app;
pub mod create_user;
pub mod error;
pub mod forms;
pub mod hooks;
pub mod navigation;
pub mod sign_in;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, UsersApi, UsersPageResponse};
pub use app::Dashboard;
pub use create_user::CreateUserFlow;
pub use error::{DashboardError, Result};
pub use forms::{CreateUserForm, FieldErrors, SignInForm};
pub use hooks::{UsersQuery, users_query_key, users_query_root};
pub use navigation::{HistoryNavigator, Navigator, Route};
pub use sign_in::{Authenticator, Session, SignInFlow};
pub use users::{User, UserPage, get_users};
