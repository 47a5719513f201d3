//! Loadout panel: badge count and item list.

use cg_api_types::LoadoutEntry;
use cg_site_core::views::render_loadout;
use std::rc::Rc;

use crate::dom::{Elements, set_text};
use crate::state::Shared;

/// Keep the panel in step with the cart.
pub fn bind(shared: &Rc<Shared>) {
    let els = shared.els.clone();
    shared.cart.on_change(move |entries| render(&els, entries));
    render(&shared.els, &shared.cart.entries());
}

fn render(els: &Elements, entries: &[LoadoutEntry]) {
    set_text(&els.loadout_count, &entries.len().to_string());
    match render_loadout(entries) {
        Ok(html) => els.loadout_items.set_inner_html(&html),
        Err(err) => tracing::warn!(target: "cg::cart", "loadout failed to render: {}", err),
    }
}
