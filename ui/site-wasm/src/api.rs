//! HTTP backend client.
//!
//! Wraps `fetch` for JSON requests to the REST backend. Authenticated calls
//! carry `Authorization: Bearer <token>`.

use async_trait::async_trait;
use cg_api_types::{
    AuthResponse, CatalogItem, ChatMessage, ContactRequest, LoginRequest, OrderRequest,
    ProductInput, RecordId, SignupRequest,
};
use cg_backend::{Backend, BackendError, BackendResult, paths};
use gloo_utils::window;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

fn js_err(context: &str, err: JsValue) -> BackendError {
    BackendError::Network(format!("{context}: {err:?}"))
}

pub struct HttpBackend {
    base: String,
}

impl HttpBackend {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Perform a fetch request, returning the raw body of a 2xx response.
    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> BackendResult<String> {
        let url = format!("{}{}", self.base, path);

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new().map_err(|e| js_err("headers", e))?;
        if let Some(token) = token {
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(|e| js_err("headers", e))?;
        }
        if let Some(body) = body {
            headers
                .set("Content-Type", "application/json")
                .map_err(|e| js_err("headers", e))?;
            opts.set_body(&JsValue::from_str(&body));
        }
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(&url, &opts).map_err(|e| js_err("request", e))?;
        let resp_value = JsFuture::from(window().fetch_with_request(&request))
            .await
            .map_err(|e| js_err("fetch", e))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| BackendError::Decode("response is not a Response".into()))?;

        let text = JsFuture::from(resp.text().map_err(|e| js_err("body", e))?)
            .await
            .map_err(|e| js_err("body", e))?
            .as_string()
            .unwrap_or_default();

        if !resp.ok() {
            tracing::debug!(target: "cg::api", method, path, status = resp.status(), "request rejected");
            return Err(BackendError::from_response(resp.status(), &resp.status_text(), &text));
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> BackendResult<T> {
        let text = self.request("GET", path, token, None).await?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> BackendResult<T> {
        let body = serde_json::to_string(body).map_err(|e| BackendError::Decode(e.to_string()))?;
        let text = self.request(method, path, token, Some(body)).await?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Like `send_json` for endpoints whose response body is ignored.
    async fn send<B: Serialize>(&self, method: &str, path: &str, token: Option<&str>, body: Option<&B>) -> BackendResult<()> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        self.request(method, path, token, body).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn products(&self) -> BackendResult<Vec<CatalogItem>> {
        self.get_json(paths::PRODUCTS, None).await
    }

    async fn product(&self, id: &RecordId) -> BackendResult<CatalogItem> {
        self.get_json(&paths::product(id), None).await
    }

    async fn create_product(&self, token: &str, input: &ProductInput) -> BackendResult<()> {
        self.send("POST", paths::PRODUCTS, Some(token), Some(input)).await
    }

    async fn delete_product(&self, token: &str, id: &RecordId) -> BackendResult<()> {
        self.send::<()>("DELETE", &paths::product(id), Some(token), None).await
    }

    async fn ai_projects(&self) -> BackendResult<Vec<CatalogItem>> {
        self.get_json(paths::AI_PROJECTS, None).await
    }

    async fn modules(&self) -> BackendResult<Vec<CatalogItem>> {
        self.get_json(paths::MODULES, None).await
    }

    async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse> {
        self.send_json("POST", paths::LOGIN, None, request).await
    }

    async fn signup(&self, request: &SignupRequest) -> BackendResult<AuthResponse> {
        self.send_json("POST", paths::SIGNUP, None, request).await
    }

    async fn create_order(&self, token: &str, request: &OrderRequest) -> BackendResult<()> {
        self.send("POST", paths::ORDERS, Some(token), Some(request)).await
    }

    async fn chat_history(&self, token: &str, user_id: &RecordId) -> BackendResult<Vec<ChatMessage>> {
        self.get_json(&paths::chat_history(user_id), Some(token)).await
    }

    async fn post_chat(&self, token: &str, message: &ChatMessage) -> BackendResult<()> {
        self.send("POST", paths::CHAT, Some(token), Some(message)).await
    }

    async fn send_contact(&self, request: &ContactRequest) -> BackendResult<()> {
        self.send("POST", paths::CONTACT, None, Some(request)).await
    }
}
