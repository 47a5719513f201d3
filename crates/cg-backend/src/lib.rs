use async_trait::async_trait;
use cg_api_types::{
    AuthResponse, CatalogItem, ChatMessage, ContactRequest, ErrorResponse, LoginRequest,
    OrderRequest, ProductInput, RecordId, SignupRequest,
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response. `message` is the server's `{error}` text when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// Build the error for a failed response from its status line and raw body.
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|parsed| parsed.error)
            .unwrap_or_else(|_| {
                if status_text.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    format!("{status} {status_text}")
                }
            });
        BackendError::Status { status, message }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// REST paths relative to the configured API base.
pub mod paths {
    use cg_api_types::RecordId;

    pub const PRODUCTS: &str = "/products";
    pub const AI_PROJECTS: &str = "/ai-projects";
    pub const MODULES: &str = "/modules";
    pub const LOGIN: &str = "/auth/login";
    pub const SIGNUP: &str = "/auth/signup";
    pub const ORDERS: &str = "/orders";
    pub const CHAT: &str = "/chat";
    pub const CONTACT: &str = "/contact";

    pub fn product(id: &RecordId) -> String {
        format!("{PRODUCTS}/{id}")
    }

    pub fn chat_history(user_id: &RecordId) -> String {
        format!("{CHAT}?userId={user_id}")
    }
}

/// Every backend endpoint the site consumes.
///
/// `?Send` because the browser implementation holds JS handles across awaits.
#[async_trait(?Send)]
pub trait Backend {
    async fn products(&self) -> BackendResult<Vec<CatalogItem>>;
    async fn product(&self, id: &RecordId) -> BackendResult<CatalogItem>;
    async fn create_product(&self, token: &str, input: &ProductInput) -> BackendResult<()>;
    async fn delete_product(&self, token: &str, id: &RecordId) -> BackendResult<()>;
    async fn ai_projects(&self) -> BackendResult<Vec<CatalogItem>>;
    async fn modules(&self) -> BackendResult<Vec<CatalogItem>>;
    async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse>;
    async fn signup(&self, request: &SignupRequest) -> BackendResult<AuthResponse>;
    async fn create_order(&self, token: &str, request: &OrderRequest) -> BackendResult<()>;
    async fn chat_history(&self, token: &str, user_id: &RecordId) -> BackendResult<Vec<ChatMessage>>;
    async fn post_chat(&self, token: &str, message: &ChatMessage) -> BackendResult<()>;
    async fn send_contact(&self, request: &ContactRequest) -> BackendResult<()>;
}
