//! HTTP adapter for the users endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::config::ClientConfig;
use shared::{Error, Result};
use shared_http::TOTAL_COUNT_HEADER;
use shared_http::api::{
    CreateUserRequest, CreateUserResponse, ErrorResponse, ListUsersResponse, UserWire,
};
use tracing::{debug, warn};

/// One page as the server sent it. The total count is the raw header value.
#[derive(Debug, Clone)]
pub struct UsersPageResponse {
    pub users: Vec<UserWire>,
    pub total_count: Option<String>,
}

/// Port for the users REST endpoints
#[async_trait]
pub trait UsersApi: Send + Sync + 'static {
    /// `GET users?page=<page>`
    async fn list_users(&self, page: u32) -> Result<UsersPageResponse>;

    /// `POST users`
    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserWire>;
}

/// `reqwest` implementation of [`UsersApi`]
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("dashgo/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl UsersApi for ApiClient {
    async fn list_users(&self, page: u32) -> Result<UsersPageResponse> {
        let url = self.url("users");
        debug!(url = %url, page, "Fetching users page");

        let response = self
            .client
            .get(&url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let total_count = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body: ListUsersResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(UsersPageResponse {
            users: body.users,
            total_count,
        })
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserWire> {
        let url = self.url("users");
        debug!(url = %url, "Creating user");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let body: CreateUserResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(body.user)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    warn!("Request failed: {}", e);
    Error::request_failed(e.status().map(|s| s.as_u16()), e.to_string())
}

/// Turn any non-2xx answer into `RequestFailed`, keeping the server's message
/// when it sent one.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };

    warn!(status = status.as_u16(), "Server rejected request: {}", message);
    Err(Error::request_failed(Some(status.as_u16()), message))
}
