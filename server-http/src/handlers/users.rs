use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared_http::api::{
    CreateUserRequest, CreateUserResponse, ErrorResponse, ListUsersParams, ListUsersResponse,
    NewUser,
};
use shared_http::TOTAL_COUNT_HEADER;
use tracing::{info, warn};

/// GET /api/users?page=<n>&per_page=<n> - One page of users, total in a header
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> impl IntoResponse {
    let per_page = params
        .per_page
        .map(|p| p as usize)
        .unwrap_or_else(|| state.page_size());

    let (users, total) = state.page(params.page, per_page).await;

    (
        [(TOTAL_COUNT_HEADER, total.to_string())],
        Json(ListUsersResponse { users }),
    )
}

/// POST /api/users - Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), (StatusCode, Json<ErrorResponse>)> {
    if let Some(field) = missing_field(&req.user) {
        warn!("Rejected user creation: {} is missing", field);
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(format!("{} is required", field))),
        ));
    }

    info!("CREATE_USER: email={}", req.user.email);

    let user = state.insert(req.user).await;
    Ok((StatusCode::CREATED, Json(CreateUserResponse { user })))
}

fn missing_field(user: &NewUser) -> Option<&'static str> {
    [
        ("name", &user.name),
        ("email", &user.email),
        ("password", &user.password),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
}
