//! In-memory doubles shared by the unit tests.

use async_trait::async_trait;
use cg_api_types::{
    AuthResponse, CatalogItem, ChatMessage, ContactRequest, LoginRequest, OrderRequest,
    ProductInput, RecordId, SignupRequest, User,
};
use cg_backend::{Backend, BackendError, BackendResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::notify::Notifier;

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

/// Backend double. Every call is logged by name; `fail` makes a named
/// operation return the given error.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: RefCell<Vec<String>>,
    pub failures: RefCell<HashMap<&'static str, BackendError>>,
    pub products: RefCell<Vec<CatalogItem>>,
    pub ai_projects: RefCell<Vec<CatalogItem>>,
    pub modules: RefCell<Vec<CatalogItem>>,
    pub auth_user: RefCell<Option<User>>,
    pub logins: RefCell<Vec<LoginRequest>>,
    pub signups: RefCell<Vec<SignupRequest>>,
    pub orders: RefCell<Vec<(String, OrderRequest)>>,
    pub chat_log: RefCell<Vec<ChatMessage>>,
    pub created: RefCell<Vec<ProductInput>>,
    pub deleted: RefCell<Vec<RecordId>>,
    pub contacts: RefCell<Vec<ContactRequest>>,
    /// Make `products` yield once before answering and log `products:done`.
    pub slow_products: Cell<bool>,
}

impl FakeBackend {
    pub fn fail(&self, op: &'static str, err: BackendError) {
        self.failures.borrow_mut().insert(op, err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn enter(&self, op: &'static str) -> BackendResult<()> {
        self.calls.borrow_mut().push(op.to_owned());
        match self.failures.borrow().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn auth_response(&self) -> AuthResponse {
        let user = self.auth_user.borrow().clone().unwrap_or_else(|| User {
            id: RecordId::Numeric(1),
            username: "neo".to_owned(),
            email: "neo@grid.dev".to_owned(),
            is_admin: false,
        });
        AuthResponse {
            token: format!("token-{}", user.id),
            user,
        }
    }
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn products(&self) -> BackendResult<Vec<CatalogItem>> {
        self.enter("products")?;
        if self.slow_products.get() {
            tokio::task::yield_now().await;
            self.calls.borrow_mut().push("products:done".to_owned());
        }
        Ok(self.products.borrow().clone())
    }

    async fn product(&self, id: &RecordId) -> BackendResult<CatalogItem> {
        self.enter("product")?;
        self.products
            .borrow()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: "Product not found".to_owned(),
            })
    }

    async fn create_product(&self, _token: &str, input: &ProductInput) -> BackendResult<()> {
        self.enter("create_product")?;
        self.created.borrow_mut().push(input.clone());
        Ok(())
    }

    async fn delete_product(&self, _token: &str, id: &RecordId) -> BackendResult<()> {
        self.enter("delete_product")?;
        self.deleted.borrow_mut().push(id.clone());
        Ok(())
    }

    async fn ai_projects(&self) -> BackendResult<Vec<CatalogItem>> {
        self.enter("ai_projects")?;
        Ok(self.ai_projects.borrow().clone())
    }

    async fn modules(&self) -> BackendResult<Vec<CatalogItem>> {
        self.enter("modules")?;
        Ok(self.modules.borrow().clone())
    }

    async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse> {
        self.enter("login")?;
        self.logins.borrow_mut().push(request.clone());
        Ok(self.auth_response())
    }

    async fn signup(&self, request: &SignupRequest) -> BackendResult<AuthResponse> {
        self.enter("signup")?;
        self.signups.borrow_mut().push(request.clone());
        let mut response = self.auth_response();
        response.user.username = request.username.clone();
        response.user.email = request.email.clone();
        Ok(response)
    }

    async fn create_order(&self, token: &str, request: &OrderRequest) -> BackendResult<()> {
        self.enter("create_order")?;
        self.orders
            .borrow_mut()
            .push((token.to_owned(), request.clone()));
        Ok(())
    }

    async fn chat_history(&self, _token: &str, _user_id: &RecordId) -> BackendResult<Vec<ChatMessage>> {
        self.enter("chat_history")?;
        Ok(self.chat_log.borrow().clone())
    }

    async fn post_chat(&self, _token: &str, message: &ChatMessage) -> BackendResult<()> {
        self.enter("post_chat")?;
        self.chat_log.borrow_mut().push(message.clone());
        Ok(())
    }

    async fn send_contact(&self, request: &ContactRequest) -> BackendResult<()> {
        self.enter("send_contact")?;
        self.contacts.borrow_mut().push(request.clone());
        Ok(())
    }
}

pub fn item(id: i64, title: &str, category: &str, tag: &str) -> CatalogItem {
    CatalogItem {
        id: RecordId::Numeric(id),
        title: title.to_owned(),
        category: category.to_owned(),
        tag: tag.to_owned(),
        img: format!("img/{id}.png"),
        desc: format!("{title} description"),
        price: None,
    }
}

pub fn admin_user() -> User {
    User {
        id: RecordId::Numeric(99),
        username: "root".to_owned(),
        email: "root@grid.dev".to_owned(),
        is_admin: true,
    }
}
