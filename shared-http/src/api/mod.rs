mod requests;
mod responses;

pub use requests::{CreateUserRequest, ListUsersParams, NewUser};
pub use responses::{CreateUserResponse, ErrorResponse, HealthResponse, ListUsersResponse, UserWire};
