//! Cyber-Grid browser shell.
//!
//! Binds the static page shell, wires the core components to browser
//! storage, HTTP and the DOM, then hands control to the router.

mod listeners;

pub mod api;
pub mod auth_ui;
pub mod cart_ui;
pub mod chat_ui;
pub mod dom;
pub mod effects;
pub mod events;
pub mod host;
pub mod modal;
pub mod remote;
pub mod state;
pub mod telemetry;
pub mod toast;

use cg_site_core::catalog::load_catalog;
use cg_site_core::views::render_init_failure;
use cg_site_core::{Catalog, SiteConfig};
use std::rc::Rc;
use tracing::{error, info};
use wasm_bindgen::prelude::*;

/// WASM entry point, run when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = match SiteConfig::from_build_env() {
        Ok(config) => config,
        Err(err) => {
            telemetry::init("info");
            error!(target: "cg::system", "invalid build configuration: {}", err);
            show_failure(&err.to_string());
            return Ok(());
        }
    };
    telemetry::init(&config.log_level);

    if let Err(err) = init(config).await {
        let message = err.as_string().unwrap_or_else(|| format!("{err:?}"));
        error!(target: "cg::system", "initialization failed: {}", message);
        show_failure(&message);
    }
    Ok(())
}

fn show_failure(message: &str) {
    if let Some(root) = dom::by_id("app-root") {
        root.set_inner_html(&render_init_failure(message));
    }
}

async fn init(config: SiteConfig) -> Result<(), JsValue> {
    info!(target: "cg::system", api = %config.api_base, remote_sync = config.remote_sync_enabled(), "booting");
    let els = dom::Elements::bind()?;
    let shared = Rc::new(state::Shared::new(config, els, Catalog::default()));

    let (catalog, source) = load_catalog(shared.backend.as_ref()).await;
    info!(target: "cg::system", ?source, "catalog ready");
    *shared.catalog.borrow_mut() = catalog;

    auth_ui::bind(&shared);
    auth_ui::observe(&shared);
    let restored = shared.sessions.restore();
    auth_ui::update(&shared.els, restored.as_ref());

    cart_ui::bind(&shared);
    shared.cart.initialize().await;
    info!(target: "cg::system", items = shared.cart.len(), "loadout ready");

    chat_ui::bind(&shared);
    if shared.sessions.is_authenticated() {
        chat_ui::start(&shared).await;
    }

    effects::init_cursor(&shared.els);
    effects::init_exit_intent(&shared);
    effects::init_konami(&shared);
    effects::init_footer(&shared.els);

    let app = state::App::new(shared);
    events::bind(&app);
    app.route_current();
    info!(target: "cg::system", "shell ready");
    Ok(())
}
