//! Mounting views into `#app-root`.
//!
//! A mount swaps the root markup, restarts the entrance animation and, after
//! a short delay, binds the view's listeners. Everything bound is collected
//! in the returned disposer, including the pending setup timer itself.

use cg_api_types::RecordId;
use cg_site_core::admin::ProductForm;
use cg_site_core::catalog::GridState;
use cg_site_core::contact::{ContactForm, transmit};
use cg_site_core::views::{self, PRODUCT_FIELDS, grid_ids};
use cg_site_core::{Disposer, GridKind, Route, ViewHost, ViewId};
use gloo_timers::callback::Timeout;
use gloo_utils::window;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlFormElement, MouseEvent};

use crate::dom::{self, add_class, remove_class};
use crate::effects;
use crate::listeners::listen;
use crate::modal;
use crate::state::Shared;

pub struct DomViewHost {
    shared: Rc<Shared>,
}

impl DomViewHost {
    pub fn new(shared: Rc<Shared>) -> Self {
        Self { shared }
    }
}

impl ViewHost for DomViewHost {
    fn mount(&self, route: &'static Route) -> Disposer {
        let html = {
            let catalog = self.shared.catalog.borrow();
            views::render_view(route.view, &catalog).unwrap_or_else(|err| {
                warn!(target: "cg::router", view = ?route.view, "view failed to render: {}", err);
                views::render_init_failure(&err.to_string())
            })
        };
        let root = &self.shared.els.app_root;
        root.set_inner_html(&html);
        restart_entrance(root);

        let bound = Rc::new(RefCell::new(Disposer::new()));
        let mut disposer = Disposer::new();
        {
            let shared = self.shared.clone();
            let bound = bound.clone();
            let view = route.view;
            let setup = Timeout::new(self.shared.config.view_setup_delay_ms, move || {
                let steps = setup_view(&shared, view);
                bound.borrow_mut().absorb(steps);
            });
            disposer.hold(setup);
        }
        disposer.push(move || {
            let steps = std::mem::take(&mut *bound.borrow_mut());
            steps.dispose();
        });
        disposer
    }

    fn push_history(&self, path: &str) {
        let pushed = window()
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(err) = pushed {
            warn!(target: "cg::router", path, "history.pushState failed: {:?}", err);
        }
    }
}

fn restart_entrance(root: &Element) {
    let Some(page) = root
        .query_selector(".page-view")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        warn!(target: "cg::router", "view has no .page-view element");
        return;
    };
    remove_class(&page, "visible");
    // reading layout forces the reflow that restarts the animation
    let _ = page.offset_width();
    add_class(&page, "visible");
}

fn setup_view(shared: &Rc<Shared>, view: ViewId) -> Disposer {
    debug!(target: "cg::router", ?view, "binding view");
    let mut disposer = match view {
        ViewId::Home => setup_home(shared),
        ViewId::AssetStore => setup_grid(shared, GridKind::Products),
        ViewId::AiProjects => setup_grid(shared, GridKind::AiProjects),
        ViewId::Contact => setup_contact(shared),
        ViewId::Admin => setup_admin(shared),
    };
    effects::update_footer_route(&shared.els, view);
    for guard in effects::bind_cursor_interactives(&shared.els) {
        disposer.hold(guard);
    }
    disposer
}

fn record_id_attr(el: &Element, attr: &str) -> Option<RecordId> {
    el.get_attribute(attr).map(|raw| RecordId::parse(&raw))
}

fn setup_home(shared: &Rc<Shared>) -> Disposer {
    let mut disposer = Disposer::new();

    if let (Some(container), Some(card)) = (dom::by_id("hero-container"), dom::by_id_typed::<HtmlElement>("hero-card")) {
        let tilted = card.clone();
        disposer.hold(listen(container.as_ref(), "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let viewport = (
                window().inner_width().ok().and_then(|v| v.as_f64()).unwrap_or_default(),
                window().inner_height().ok().and_then(|v| v.as_f64()).unwrap_or_default(),
            );
            let page = (f64::from(event.page_x()), f64::from(event.page_y()));
            let transform = cg_site_core::effects::tilt_transform(cg_site_core::effects::hero_tilt(viewport, page));
            dom::set_style(&tilted, "transform", &transform);
        }));
        let settled = card.clone();
        disposer.hold(listen(container.as_ref(), "mouseleave", move |_| {
            dom::set_style(&settled, "transform", "rotateY(0deg) rotateX(0deg)");
            dom::set_style(&settled, "transition", "transform 0.5s ease");
        }));
        disposer.hold(listen(container.as_ref(), "mouseenter", move |_| {
            dom::set_style(&card, "transition", "none");
        }));
    }

    for card in dom::query_all(".module-card") {
        let shared = shared.clone();
        let target = card.clone();
        disposer.hold(listen(card.as_ref(), "click", move |_| {
            if let Some(id) = record_id_attr(&target, "data-module-id") {
                modal::open_module(&shared, &id);
            }
        }));
    }

    for card in dom::query_all(".featured-card") {
        let shared = shared.clone();
        let target = card.clone();
        disposer.hold(listen(card.as_ref(), "click", move |_| {
            if let Some(id) = record_id_attr(&target, "data-project-id") {
                modal::open_product(&shared, &id);
            }
        }));
    }

    if let Some(button) = dom::by_id("scroll-top") {
        disposer.hold(listen(button.as_ref(), "click", |_| dom::scroll_to_top()));
    }
    disposer
}

fn render_grid(shared: &Shared, state: &GridState) {
    let ids = grid_ids(state.kind);
    let Some(container) = dom::by_id(ids.grid) else {
        return;
    };
    let catalog = shared.catalog.borrow();
    let page = state.view(&catalog, shared.config.page_size);
    match views::render_grid(state.kind, &page) {
        Ok(html) => container.set_inner_html(&html),
        Err(err) => warn!(target: "cg::catalog", "grid failed to render: {}", err),
    }
    if let Some(button) = dom::by_id_typed::<HtmlElement>(ids.load_more) {
        dom::set_display(&button, if page.has_more { "inline-block" } else { "none" });
    }
}

fn setup_grid(shared: &Rc<Shared>, kind: GridKind) -> Disposer {
    let mut disposer = Disposer::new();
    let state = Rc::new(RefCell::new(GridState::new(kind)));
    render_grid(shared, &state.borrow());

    let buttons = dom::query_all(".filter-btn");
    for button in &buttons {
        let shared = shared.clone();
        let state = state.clone();
        let all = buttons.clone();
        let this = button.clone();
        disposer.hold(listen(button.as_ref(), "click", move |_| {
            for other in &all {
                remove_class(other, "active");
            }
            add_class(&this, "active");
            let filter = this.get_attribute("data-filter").unwrap_or_default();
            state.borrow_mut().select_filter(&filter);
            render_grid(&shared, &state.borrow());
        }));
    }

    let ids = grid_ids(kind);
    if let Some(button) = dom::by_id(ids.load_more) {
        let shared = shared.clone();
        let state = state.clone();
        disposer.hold(listen(button.as_ref(), "click", move |_| {
            state.borrow_mut().load_more();
            render_grid(&shared, &state.borrow());
        }));
    }

    // Cards are re-rendered on every filter change, so clicks are handled on
    // the container.
    if let Some(grid) = dom::by_id(ids.grid) {
        let shared = shared.clone();
        disposer.hold(listen(grid.as_ref(), "click", move |event| {
            let (quick_attr, card_attr) = match kind {
                GridKind::Products => ("data-quick-id", "data-project-id"),
                GridKind::AiProjects => ("data-quick-ai-id", "data-ai-id"),
            };
            let id = match dom::closest(&event, ".quick-view") {
                Some(quick) => {
                    event.stop_propagation();
                    record_id_attr(&quick, quick_attr)
                }
                None => dom::closest(&event, ".card").and_then(|card| record_id_attr(&card, card_attr)),
            };
            match (kind, id) {
                (GridKind::Products, Some(id)) => modal::open_product(&shared, &id),
                (GridKind::AiProjects, Some(id)) => modal::open_ai_project(&shared, &id),
                _ => {}
            }
        }));
    }
    disposer
}

fn setup_contact(shared: &Rc<Shared>) -> Disposer {
    let mut disposer = Disposer::new();
    let Some(form) = dom::by_id_typed::<HtmlFormElement>("cyber-contact-form") else {
        return disposer;
    };
    let shared = shared.clone();
    let target = form.clone();
    disposer.hold(listen(form.as_ref(), "submit", move |event| {
        event.prevent_default();
        let contact = ContactForm {
            name: dom::field_value("sender-name"),
            email: dom::field_value("sender-email"),
            message: dom::field_value("sender-msg"),
        };
        let shared = shared.clone();
        let form = target.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if transmit(shared.backend.as_ref(), shared.notifier.as_ref(), &contact).await {
                form.reset();
            }
        });
    }));
    disposer
}

async fn refresh_admin_list(shared: &Shared) {
    let products = shared.admin.list().await;
    let Some(container) = dom::by_id("admin-product-list") else {
        return;
    };
    match views::render_admin_products(&products) {
        Ok(html) => container.set_inner_html(&html),
        Err(err) => warn!(target: "cg::admin", "product list failed to render: {}", err),
    }
}

fn read_product_form() -> ProductForm {
    // PRODUCT_FIELDS lists the inputs in ProductForm field order
    let mut values = PRODUCT_FIELDS.iter().map(|field| dom::field_value(field.id));
    let mut next = || values.next().unwrap_or_default();
    ProductForm {
        title: next(),
        category: next(),
        tag: next(),
        img: next(),
        description: next(),
        price: next(),
    }
}

fn fill_product_form(form: &ProductForm) {
    let values = [&form.title, &form.category, &form.tag, &form.img, &form.description, &form.price];
    for (field, value) in PRODUCT_FIELDS.iter().zip(values) {
        dom::set_field_value(field.id, value);
    }
}

fn setup_admin(shared: &Rc<Shared>) -> Disposer {
    let mut disposer = Disposer::new();
    {
        let shared = shared.clone();
        wasm_bindgen_futures::spawn_local(async move { refresh_admin_list(&shared).await });
    }

    if let Some(form) = dom::by_id_typed::<HtmlFormElement>("add-product-form") {
        let shared = shared.clone();
        let target = form.clone();
        disposer.hold(listen(form.as_ref(), "submit", move |event| {
            event.prevent_default();
            let input = read_product_form();
            let shared = shared.clone();
            let form = target.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if shared.admin.add(&input).await {
                    form.reset();
                    refresh_admin_list(&shared).await;
                }
            });
        }));
    }

    if let Some(list) = dom::by_id("admin-product-list") {
        let shared = shared.clone();
        disposer.hold(listen(list.as_ref(), "click", move |event| {
            if let Some(button) = dom::closest(&event, "[data-edit-id]") {
                let Some(id) = record_id_attr(&button, "data-edit-id") else {
                    return;
                };
                let shared = shared.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Some(form) = shared.admin.load_for_edit(&id).await {
                        fill_product_form(&form);
                        dom::scroll_to_top();
                    }
                });
            } else if let Some(button) = dom::closest(&event, "[data-delete-id]") {
                let Some(id) = record_id_attr(&button, "data-delete-id") else {
                    return;
                };
                let confirmed = window().confirm_with_message("Delete this product?").unwrap_or(false);
                if !confirmed {
                    return;
                }
                let shared = shared.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if shared.admin.delete(&id).await {
                        refresh_admin_list(&shared).await;
                    }
                });
            }
        }));
    }
    disposer
}
