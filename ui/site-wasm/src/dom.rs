//! DOM element bindings.
//!
//! Shell elements (header, modals, loadout panel, chat, footer) are resolved
//! once at startup into `Elements`. View content under `#app-root` is
//! replaced on every navigation and looked up per mount instead.

use gloo_utils::{document, window};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlFormElement, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement};

// ── Helpers ──

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(nodes) = document().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Element that received the event, or its nearest ancestor matching `selector`.
pub fn closest(event: &web_sys::Event, selector: &str) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest(selector).ok()?
}

pub fn event_element(event: &web_sys::Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

pub fn set_display(el: &HtmlElement, value: &str) {
    set_style(el, "display", value);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

/// Value of an `<input>` or `<textarea>` inside the current view.
pub fn field_value(id: &str) -> String {
    if let Some(input) = by_id_typed::<HtmlInputElement>(id) {
        return input.value();
    }
    by_id_typed::<HtmlTextAreaElement>(id)
        .map(|area| area.value())
        .unwrap_or_default()
}

pub fn set_field_value(id: &str, value: &str) {
    if let Some(input) = by_id_typed::<HtmlInputElement>(id) {
        input.set_value(value);
    } else if let Some(area) = by_id_typed::<HtmlTextAreaElement>(id) {
        area.set_value(value);
    }
}

pub fn scroll_to_top() {
    let opts = web_sys::ScrollToOptions::new();
    opts.set_top(0.0);
    opts.set_behavior(web_sys::ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&opts);
}

// ── Elements struct ──

/// Shell element references. Clone-friendly (JS handles are reference-counted).
#[derive(Clone)]
pub struct Elements {
    pub body: HtmlElement,
    pub app_root: Element,

    // Header / auth
    pub login_btn: HtmlElement,
    pub signup_btn: HtmlElement,
    pub logout_btn: HtmlElement,
    pub admin_link: HtmlElement,
    pub login_modal: Element,
    pub signup_modal: Element,
    pub close_login_modal: HtmlElement,
    pub close_signup_modal: HtmlElement,
    pub switch_to_signup: HtmlElement,
    pub switch_to_login: HtmlElement,
    pub login_form: HtmlFormElement,
    pub signup_form: HtmlFormElement,
    pub login_email: HtmlInputElement,
    pub login_password: HtmlInputElement,
    pub signup_username: HtmlInputElement,
    pub signup_email: HtmlInputElement,
    pub signup_password: HtmlInputElement,

    // Loadout panel
    pub loadout_toggle: HtmlElement,
    pub loadout_count: Element,
    pub loadout_modal: Element,
    pub loadout_items: Element,
    pub close_loadout: HtmlElement,
    pub purge_loadout: HtmlElement,
    pub deploy_loadout: HtmlElement,

    // Item / module modals
    pub item_modal: Element,
    pub modal_img: HtmlImageElement,
    pub modal_title: HtmlElement,
    pub modal_category: Element,
    pub modal_desc: Element,
    pub add_to_loadout_btn: HtmlElement,
    pub close_item_modal: HtmlElement,
    pub module_modal: Element,
    pub module_modal_img: HtmlImageElement,
    pub module_modal_title: HtmlElement,
    pub module_modal_desc: Element,
    pub close_module_modal: HtmlElement,

    // Chat
    pub chatbot_container: HtmlElement,
    pub cat_avatar: HtmlElement,
    pub toggle_chat: HtmlElement,
    pub chat_window: Element,
    pub close_chat: HtmlElement,
    pub chat_messages: Element,
    pub chat_input: HtmlInputElement,
    pub send_chat: HtmlElement,

    // Effects
    pub custom_cursor: HtmlElement,
    pub cursor_trail: Element,
    pub exit_modal: Element,
    pub close_exit_modal: HtmlElement,
    pub return_btn: HtmlElement,

    // Footer
    pub footer_route: Element,
    pub footer_clock: Element,
    pub footer_stats: Element,
    pub footer_username: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id).ok_or_else(|| {
            JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id))
        })?
    };
}

impl Elements {
    /// Resolve all shell references. Call once the document has loaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            body: document()
                .body()
                .ok_or_else(|| JsValue::from_str("missing <body>"))?,
            app_root: get_el!("app-root"),

            login_btn: get_typed!(HtmlElement, "login-btn"),
            signup_btn: get_typed!(HtmlElement, "signup-btn"),
            logout_btn: get_typed!(HtmlElement, "logout-btn"),
            admin_link: get_typed!(HtmlElement, "admin-link"),
            login_modal: get_el!("login-modal"),
            signup_modal: get_el!("signup-modal"),
            close_login_modal: get_typed!(HtmlElement, "close-login-modal"),
            close_signup_modal: get_typed!(HtmlElement, "close-signup-modal"),
            switch_to_signup: get_typed!(HtmlElement, "switch-to-signup"),
            switch_to_login: get_typed!(HtmlElement, "switch-to-login"),
            login_form: get_typed!(HtmlFormElement, "login-form"),
            signup_form: get_typed!(HtmlFormElement, "signup-form"),
            login_email: get_typed!(HtmlInputElement, "login-email"),
            login_password: get_typed!(HtmlInputElement, "login-password"),
            signup_username: get_typed!(HtmlInputElement, "signup-username"),
            signup_email: get_typed!(HtmlInputElement, "signup-email"),
            signup_password: get_typed!(HtmlInputElement, "signup-password"),

            loadout_toggle: get_typed!(HtmlElement, "loadout-toggle"),
            loadout_count: get_el!("loadout-count"),
            loadout_modal: get_el!("loadout-modal"),
            loadout_items: get_el!("loadout-items-container"),
            close_loadout: get_typed!(HtmlElement, "close-loadout"),
            purge_loadout: get_typed!(HtmlElement, "purge-loadout"),
            deploy_loadout: get_typed!(HtmlElement, "deploy-loadout"),

            item_modal: get_el!("item-modal"),
            modal_img: get_typed!(HtmlImageElement, "modal-img"),
            modal_title: get_typed!(HtmlElement, "modal-title"),
            modal_category: get_el!("modal-category"),
            modal_desc: get_el!("modal-desc"),
            add_to_loadout_btn: get_typed!(HtmlElement, "add-to-loadout-btn"),
            close_item_modal: get_typed!(HtmlElement, "close-item-modal"),
            module_modal: get_el!("module-modal"),
            module_modal_img: get_typed!(HtmlImageElement, "module-modal-img"),
            module_modal_title: get_typed!(HtmlElement, "module-modal-title"),
            module_modal_desc: get_el!("module-modal-desc"),
            close_module_modal: get_typed!(HtmlElement, "close-module-modal"),

            chatbot_container: get_typed!(HtmlElement, "chatbot-container"),
            cat_avatar: get_typed!(HtmlElement, "cat-avatar"),
            toggle_chat: get_typed!(HtmlElement, "toggle-chat"),
            chat_window: get_el!("chat-window"),
            close_chat: get_typed!(HtmlElement, "close-chat"),
            chat_messages: get_el!("chat-messages"),
            chat_input: get_typed!(HtmlInputElement, "chat-input"),
            send_chat: get_typed!(HtmlElement, "send-chat"),

            custom_cursor: get_typed!(HtmlElement, "custom-cursor"),
            cursor_trail: get_el!("cursor-trail-container"),
            exit_modal: get_el!("exit-modal"),
            close_exit_modal: get_typed!(HtmlElement, "close-exit-modal"),
            return_btn: get_typed!(HtmlElement, "return-btn"),

            footer_route: get_el!("footer-route"),
            footer_clock: get_el!("footer-clock"),
            footer_stats: get_el!("footer-stats"),
            footer_username: get_el!("footer-username"),
        })
    }
}
