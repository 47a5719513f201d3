//! Cosmetic effects: cursor, trail, exit intent, konami code, footer.

use cg_site_core::ViewId;
use cg_site_core::effects::{
    CLOCK_TICK_MS, CURSOR_INTERACTIVE_SELECTOR, KONAMI_EFFECT_MS, STATS_TICK_MS, TRAIL_PARTICLE_MS,
    footer_username, simulated_stats, trail_spawn,
};
use gloo_timers::callback::{Interval, Timeout};
use gloo_utils::{document, window};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent};

use crate::dom::{self, Elements, add_class, remove_class, set_text};
use crate::listeners::{ListenerGuard, listen, listen_forever};
use crate::state::Shared;

pub fn init_cursor(els: &Elements) {
    let cursor = els.custom_cursor.clone();
    dom::set_display(&cursor, "block");
    dom::set_style(&cursor, "opacity", "1");
    dom::set_style(&cursor, "pointer-events", "none");
    dom::set_style(&els.body, "cursor", "none");

    let width = window().inner_width().ok().and_then(|v| v.as_f64()).unwrap_or_default();
    let height = window().inner_height().ok().and_then(|v| v.as_f64()).unwrap_or_default();
    move_to(&cursor, width / 2.0, height / 2.0);

    let trail = els.cursor_trail.clone();
    let follower = cursor.clone();
    listen_forever(document().as_ref(), "mousemove", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = (f64::from(event.client_x()), f64::from(event.client_y()));
        move_to(&follower, x, y);
        if trail_spawn(js_sys::Math::random()) {
            spawn_particle(&trail, x, y);
        }
    });

    let dimmed = cursor.clone();
    listen_forever(document().as_ref(), "mouseleave", move |_| {
        dom::set_style(&dimmed, "opacity", "0.3");
    });
    listen_forever(document().as_ref(), "mouseenter", move |_| {
        dom::set_style(&cursor, "opacity", "1");
    });
    tracing::debug!(target: "cg::effects", "custom cursor active");
}

fn move_to(el: &HtmlElement, x: f64, y: f64) {
    dom::set_style(el, "left", &format!("{x}px"));
    dom::set_style(el, "top", &format!("{y}px"));
}

fn spawn_particle(container: &web_sys::Element, x: f64, y: f64) {
    let Ok(particle) = dom::create_element("div") else {
        return;
    };
    add_class(&particle, "trail-particle");
    if let Some(particle) = particle.dyn_ref::<HtmlElement>() {
        move_to(particle, x, y);
    }
    if container.append_child(&particle).is_ok() {
        Timeout::new(TRAIL_PARTICLE_MS, move || particle.remove()).forget();
    }
}

/// Cursor highlight on interactive elements of the current page.
pub fn bind_cursor_interactives(els: &Elements) -> Vec<ListenerGuard> {
    let mut guards = Vec::new();
    for el in dom::query_all(CURSOR_INTERACTIVE_SELECTOR) {
        let cursor = els.custom_cursor.clone();
        guards.push(listen(el.as_ref(), "mouseenter", move |_| add_class(&cursor, "active")));
        let cursor = els.custom_cursor.clone();
        guards.push(listen(el.as_ref(), "mouseleave", move |_| remove_class(&cursor, "active")));
    }
    guards
}

pub fn init_exit_intent(shared: &Rc<Shared>) {
    let els = &shared.els;
    {
        let shared = shared.clone();
        listen_forever(document().as_ref(), "mouseleave", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if shared.exit_intent.borrow_mut().pointer_left(f64::from(event.client_y())) {
                add_class(&shared.els.exit_modal, "active");
            }
        });
    }
    for button in [&els.close_exit_modal, &els.return_btn] {
        let modal = els.exit_modal.clone();
        listen_forever(button.as_ref(), "click", move |_| remove_class(&modal, "active"));
    }
    let modal = els.exit_modal.clone();
    listen_forever(window().as_ref(), "click", move |event| {
        if dom::event_element(&event).as_ref() == Some(&modal) {
            remove_class(&modal, "active");
        }
    });
}

pub fn init_konami(shared: &Rc<Shared>) {
    let shared = shared.clone();
    listen_forever(document().as_ref(), "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if shared.konami.borrow_mut().press(event.key_code()) {
            tracing::info!(target: "cg::effects", "konami code entered");
            hue_flash(&shared.els);
        }
    });
}

/// Invert the page hue for a few seconds.
pub fn hue_flash(els: &Elements) {
    dom::set_style(&els.body, "filter", "hue-rotate(180deg)");
    let body = els.body.clone();
    Timeout::new(KONAMI_EFFECT_MS, move || dom::set_style(&body, "filter", "")).forget();
}

pub fn init_footer(els: &Elements) {
    let clock = els.footer_clock.clone();
    let tick = move || {
        let now = js_sys::Date::new_0();
        set_text(&clock, &String::from(now.to_locale_time_string("default")));
    };
    tick();
    Interval::new(CLOCK_TICK_MS, tick).forget();

    let stats = els.footer_stats.clone();
    Interval::new(STATS_TICK_MS, move || {
        set_text(&stats, &simulated_stats(js_sys::Math::random(), js_sys::Math::random()));
    })
    .forget();
}

pub fn update_footer_route(els: &Elements, view: ViewId) {
    set_text(&els.footer_route, view.footer_label());
}

pub fn update_footer_user(els: &Elements, username: Option<&str>) {
    set_text(&els.footer_username, &footer_username(username));
}
