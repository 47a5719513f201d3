//! Shell-wide listeners.
//!
//! Everything here is bound once and lives as long as the page. Clicks on
//! markup that views re-render (in-app links, loadout rows, the acquire
//! button) are delegated from `<body>`.

use cg_api_types::RecordId;
use cg_site_core::CheckoutOutcome;
use gloo_utils::window;
use std::rc::Rc;

use crate::dom::{self, add_class};
use crate::listeners::{listen_forever, on_click, on_click_async};
use crate::modal;
use crate::state::{App, Shared};

pub fn bind(app: &Rc<App>) {
    let shared = &app.shared;
    let els = &shared.els;

    {
        let app = app.clone();
        listen_forever(els.body.as_ref(), "click", move |event| {
            if let Some(link) = dom::closest(&event, "[data-link]") {
                event.prevent_default();
                let href = link.get_attribute("href").unwrap_or_else(|| "/".into());
                app.navigate_to(&href);
            } else if let Some(button) = dom::closest(&event, ".remove-btn") {
                let Some(id) = button.get_attribute("data-remove-id") else {
                    return;
                };
                let shared = app.shared.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    shared.cart.remove(&RecordId::parse(&id)).await;
                });
            } else if dom::closest(&event, "#add-to-loadout-btn").is_some() {
                modal::acquire_selected(&app.shared);
            }
        });
    }

    {
        let app = app.clone();
        listen_forever(window().as_ref(), "popstate", move |_| app.route_current());
    }

    {
        let shared = shared.clone();
        on_click!(els.close_item_modal, move |_| modal::close_item(&shared));
    }
    {
        let shared = shared.clone();
        on_click!(els.close_module_modal, move |_| modal::close_module(&shared));
    }

    for trigger in [&els.loadout_toggle, &els.close_loadout] {
        let panel = els.loadout_modal.clone();
        on_click!(trigger, move |_| {
            let _ = panel.class_list().toggle("hidden");
        });
    }
    on_click_async!(els.purge_loadout, shared, purge);
    on_click_async!(els.deploy_loadout, shared, deploy);
}

async fn purge(shared: &Rc<Shared>) {
    shared.cart.purge().await;
}

async fn deploy(shared: &Rc<Shared>) {
    if shared.cart.checkout().await == CheckoutOutcome::LoginRequired {
        add_class(&shared.els.login_modal, "active");
    }
}
