//! Application context.
//!
//! One `Shared` value owns every component and is passed around as
//! `Rc<Shared>` (WASM is single-threaded). The router sits in `App` on top of
//! it so view hosts can reach the components without a reference cycle.

use anyhow::anyhow;
use cg_api_types::CatalogItem;
use cg_backend::Backend;
use cg_site_core::admin::AdminPanel;
use cg_site_core::chat::ChatAssistant;
use cg_site_core::effects::{ExitIntent, KonamiTracker};
use cg_site_core::{Catalog, LoadoutManager, Router, SessionManager, SiteConfig};
use cg_storage::{LocalStore, RemoteCartStore};
use gloo_storage::{LocalStorage, Storage};
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::HttpBackend;
use crate::dom::Elements;
use crate::host::DomViewHost;
use crate::remote::FirebaseMirror;
use crate::toast::ToastNotifier;

/// `localStorage` as a plain string store; values stay in the formats other
/// tabs and older builds wrote.
pub struct BrowserLocalStore;

impl LocalStore for BrowserLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| anyhow!("localStorage.setItem({key}) failed: {err:?}"))
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|err| anyhow!("localStorage.removeItem({key}) failed: {err:?}"))
    }
}

pub struct Shared {
    pub config: SiteConfig,
    pub els: Elements,
    pub backend: Rc<dyn Backend>,
    pub notifier: Rc<ToastNotifier>,
    pub catalog: RefCell<Catalog>,
    pub sessions: SessionManager,
    pub cart: LoadoutManager,
    pub chat: ChatAssistant,
    pub admin: AdminPanel,
    /// Item shown in the detail modal, the target of "acquire".
    pub selected: RefCell<Option<CatalogItem>>,
    pub konami: RefCell<KonamiTracker>,
    pub exit_intent: RefCell<ExitIntent>,
}

impl Shared {
    pub fn new(config: SiteConfig, els: Elements, catalog: Catalog) -> Self {
        let local: Rc<dyn LocalStore> = Rc::new(BrowserLocalStore);
        let backend: Rc<dyn Backend> = Rc::new(HttpBackend::new(config.api_base.clone()));
        let notifier = Rc::new(ToastNotifier::new(config.toast_ms));
        let remote: Option<Rc<dyn RemoteCartStore>> = config
            .remote_sync_url
            .as_deref()
            .map(|url| Rc::new(FirebaseMirror::new(url)) as Rc<dyn RemoteCartStore>);

        let sessions = SessionManager::new(local.clone(), backend.clone(), notifier.clone());
        let cart = LoadoutManager::new(local, remote, backend.clone(), notifier.clone(), sessions.clone());
        let chat = ChatAssistant::new(backend.clone(), sessions.clone());
        let admin = AdminPanel::new(backend.clone(), sessions.clone(), notifier.clone());

        Self {
            config,
            els,
            backend,
            notifier,
            catalog: RefCell::new(catalog),
            sessions,
            cart,
            chat,
            admin,
            selected: RefCell::new(None),
            konami: RefCell::new(KonamiTracker::default()),
            exit_intent: RefCell::new(ExitIntent::default()),
        }
    }
}

pub struct App {
    pub shared: Rc<Shared>,
    pub router: Router<DomViewHost>,
}

impl App {
    pub fn new(shared: Rc<Shared>) -> Rc<Self> {
        let router = Router::new(
            DomViewHost::new(shared.clone()),
            shared.sessions.clone(),
            shared.notifier.clone(),
        );
        Rc::new(Self { shared, router })
    }

    /// Route to the window's current location.
    pub fn route_current(&self) {
        let location = gloo_utils::window().location();
        let pathname = location.pathname().unwrap_or_else(|_| "/".into());
        let protocol = location.protocol().unwrap_or_default();
        self.router.route(&pathname, &protocol);
    }

    pub fn navigate_to(&self, url: &str) {
        let protocol = gloo_utils::window().location().protocol().unwrap_or_default();
        self.router.navigate_to(url, &protocol);
    }
}
