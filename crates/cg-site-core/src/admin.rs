//! Admin product management.

use cg_api_types::{CatalogItem, ProductInput, RecordId};
use cg_backend::Backend;
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};

use crate::notify::{Notifier, error_message};
use crate::session::SessionManager;

pub const EDIT_LOADED_NOTICE: &str =
    "// Asset loaded into form. (For now, add the updated version and delete the old one!)";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price must be a number, got {0:?}")]
    InvalidPrice(String),
}

/// Raw values of the product form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub category: String,
    pub tag: String,
    pub img: String,
    pub description: String,
    pub price: String,
}

impl ProductForm {
    pub fn to_input(&self) -> Result<ProductInput, ProductFormError> {
        let field = |name: &'static str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(ProductFormError::MissingField(name))
            } else {
                Ok(value.to_owned())
            }
        };
        let raw_price = field("price", &self.price)?;
        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| ProductFormError::InvalidPrice(raw_price.clone()))?;

        Ok(ProductInput {
            title: field("title", &self.title)?,
            category: field("category", &self.category)?,
            tag: field("tag", &self.tag)?,
            img: field("img", &self.img)?,
            description: field("description", &self.description)?,
            price,
        })
    }
}

impl From<&CatalogItem> for ProductForm {
    fn from(item: &CatalogItem) -> Self {
        Self {
            title: item.title.clone(),
            category: item.category.clone(),
            tag: item.tag.clone(),
            img: item.img.clone(),
            description: item.desc.clone(),
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

pub struct AdminPanel {
    backend: Rc<dyn Backend>,
    session: SessionManager,
    notifier: Rc<dyn Notifier>,
}

impl AdminPanel {
    pub fn new(backend: Rc<dyn Backend>, session: SessionManager, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            backend,
            session,
            notifier,
        }
    }

    /// Current products straight from the backend. Empty on failure.
    pub async fn list(&self) -> Vec<CatalogItem> {
        match self.backend.products().await {
            Ok(products) => products,
            Err(err) => {
                warn!(target: "cg::admin", "product list unavailable: {}", err);
                Vec::new()
            }
        }
    }

    pub async fn add(&self, form: &ProductForm) -> bool {
        let Some(token) = self.admin_token() else {
            return false;
        };
        let input = match form.to_input() {
            Ok(input) => input,
            Err(err) => {
                warn!(target: "cg::admin", "product form rejected: {}", err);
                self.notifier.notify("// Failed to add product");
                return false;
            }
        };
        match self.backend.create_product(&token, &input).await {
            Ok(()) => {
                info!(target: "cg::admin", title = %input.title, "product added");
                self.notifier.notify("// Product added");
                true
            }
            Err(err) => {
                warn!(target: "cg::admin", "create product failed: {}", err);
                self.notifier.notify("// Failed to add product");
                false
            }
        }
    }

    /// Delete after the caller has confirmed with the visitor.
    pub async fn delete(&self, id: &RecordId) -> bool {
        let Some(token) = self.admin_token() else {
            return false;
        };
        match self.backend.delete_product(&token, id).await {
            Ok(()) => {
                info!(target: "cg::admin", %id, "product deleted");
                self.notifier.notify("// Product deleted");
                true
            }
            Err(err) => {
                warn!(target: "cg::admin", %id, "delete failed: {}", err);
                self.notifier.notify("// Delete failed");
                false
            }
        }
    }

    /// Fetch one product and turn it into form values.
    pub async fn load_for_edit(&self, id: &RecordId) -> Option<ProductForm> {
        match self.backend.product(id).await {
            Ok(product) => {
                self.notifier.notify(EDIT_LOADED_NOTICE);
                Some(ProductForm::from(&product))
            }
            Err(err) => {
                self.notifier.notify(&error_message(&err));
                None
            }
        }
    }

    fn admin_token(&self) -> Option<String> {
        match self.session.current() {
            Some(session) if session.is_admin() => Some(session.token),
            _ => {
                self.notifier.notify("// Admin access only");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, RecordingNotifier, admin_user, item};
    use cg_backend::BackendError;
    use cg_storage::InMemoryLocalStore;

    fn form() -> ProductForm {
        ProductForm {
            title: "Shader Pack".into(),
            category: "ue5".into(),
            tag: "UE5".into(),
            img: "images/shader.jpg".into(),
            description: "Neon materials".into(),
            price: " 19.99 ".into(),
        }
    }

    struct Harness {
        backend: Rc<FakeBackend>,
        notifier: Rc<RecordingNotifier>,
        sessions: SessionManager,
        panel: AdminPanel,
    }

    fn harness() -> Harness {
        let backend = Rc::new(FakeBackend::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let sessions = SessionManager::new(
            Rc::new(InMemoryLocalStore::default()),
            backend.clone(),
            notifier.clone(),
        );
        let panel = AdminPanel::new(backend.clone(), sessions.clone(), notifier.clone());
        Harness {
            backend,
            notifier,
            sessions,
            panel,
        }
    }

    async fn as_admin() -> Harness {
        let h = harness();
        h.backend.auth_user.replace(Some(admin_user()));
        h.sessions.login("root@grid.dev", "pw").await.unwrap();
        h
    }

    #[test]
    fn form_parses_price_as_decimal() {
        let input = form().to_input().unwrap();
        assert_eq!(input.price, 19.99);

        let mut bad = form();
        bad.price = "cheap".into();
        assert_eq!(bad.to_input(), Err(ProductFormError::InvalidPrice("cheap".into())));

        let mut missing = form();
        missing.tag = " ".into();
        assert_eq!(missing.to_input(), Err(ProductFormError::MissingField("tag")));
    }

    #[tokio::test]
    async fn add_and_delete_report_outcomes() {
        let h = as_admin().await;
        assert!(h.panel.add(&form()).await);
        assert_eq!(h.notifier.last().as_deref(), Some("// Product added"));
        assert_eq!(h.backend.created.borrow()[0].title, "Shader Pack");

        assert!(h.panel.delete(&RecordId::Numeric(3)).await);
        assert_eq!(h.notifier.last().as_deref(), Some("// Product deleted"));

        h.backend.fail("delete_product", BackendError::Status { status: 500, message: "boom".into() });
        assert!(!h.panel.delete(&RecordId::Numeric(3)).await);
        assert_eq!(h.notifier.last().as_deref(), Some("// Delete failed"));

        h.backend.fail("create_product", BackendError::Network("offline".into()));
        assert!(!h.panel.add(&form()).await);
        assert_eq!(h.notifier.last().as_deref(), Some("// Failed to add product"));
    }

    #[tokio::test]
    async fn non_admins_are_refused_without_a_request() {
        let h = harness();
        h.sessions.login("neo@grid.dev", "pw").await.unwrap();
        let calls = h.backend.calls().len();

        assert!(!h.panel.add(&form()).await);
        assert_eq!(h.backend.calls().len(), calls);
        assert_eq!(h.notifier.last().as_deref(), Some("// Admin access only"));
    }

    #[tokio::test]
    async fn edit_loads_product_into_form() {
        let h = as_admin().await;
        let mut product = item(4, "Neural Net", "ai cpp", "AI");
        product.price = Some(42.5);
        h.backend.products.borrow_mut().push(product);

        let loaded = h.panel.load_for_edit(&RecordId::parse("4")).await.unwrap();
        assert_eq!(loaded.title, "Neural Net");
        assert_eq!(loaded.price, "42.5");
        assert_eq!(h.notifier.last().as_deref(), Some(EDIT_LOADED_NOTICE));

        assert!(h.panel.load_for_edit(&RecordId::Numeric(77)).await.is_none());
        assert_eq!(h.notifier.last().as_deref(), Some("// Error: Product not found"));
        assert_eq!(h.panel.list().await.len(), 1);
    }
}
