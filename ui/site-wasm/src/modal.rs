//! Item and module detail modals.

use cg_api_types::{CatalogItem, LoadoutEntry, RecordId};
use gloo_timers::callback::Timeout;
use std::rc::Rc;

use crate::dom::{self, add_class, remove_class, set_text};
use crate::state::Shared;

const ACQUIRE_LABEL: &str = "ACQUIRE ASSET";
const STORED_LABEL: &str = "STORED IN MEMORY";

fn show_item(shared: &Shared, item: CatalogItem) {
    let els = &shared.els;
    els.modal_img.set_src(&item.img);
    set_text(&els.modal_title, &item.title);
    let _ = els.modal_title.set_attribute("data-text", &item.title);
    set_text(&els.modal_category, &item.tag);
    set_text(&els.modal_desc, &item.desc);
    add_class(&els.item_modal, "active");
    *shared.selected.borrow_mut() = Some(item);
}

pub fn open_product(shared: &Shared, id: &RecordId) {
    let item = shared.catalog.borrow().product(id).cloned();
    if let Some(item) = item {
        show_item(shared, item);
    }
}

pub fn open_ai_project(shared: &Shared, id: &RecordId) {
    let item = shared.catalog.borrow().ai_project(id).cloned();
    if let Some(item) = item {
        show_item(shared, item);
    }
}

pub fn open_module(shared: &Shared, id: &RecordId) {
    let catalog = shared.catalog.borrow();
    let Some(module) = catalog.module(id) else {
        return;
    };
    let els = &shared.els;
    els.module_modal_img.set_src(&module.img);
    set_text(&els.module_modal_title, &module.title);
    let _ = els.module_modal_title.set_attribute("data-text", &module.title);
    set_text(&els.module_modal_desc, &module.desc);
    add_class(&els.module_modal, "active");
}

pub fn close_item(shared: &Shared) {
    remove_class(&shared.els.item_modal, "active");
}

pub fn close_module(shared: &Shared) {
    remove_class(&shared.els.module_modal, "active");
}

/// Store the item shown in the modal, confirm on the button, then close.
pub fn acquire_selected(shared: &Rc<Shared>) {
    let Some(item) = shared.selected.borrow().clone() else {
        return;
    };
    let cart = shared.cart.clone();
    wasm_bindgen_futures::spawn_local(async move {
        cart.add(LoadoutEntry::from(&item)).await;
    });

    let button = &shared.els.add_to_loadout_btn;
    set_text(button, STORED_LABEL);
    dom::set_style(button, "background", "rgba(189,0,255,0.2)");

    let shared = shared.clone();
    Timeout::new(shared.config.acquire_close_delay_ms, move || {
        close_item(&shared);
        let button = &shared.els.add_to_loadout_btn;
        set_text(button, ACQUIRE_LABEL);
        dom::set_style(button, "background", "rgba(0,240,255,0.1)");
    })
    .forget();
}
