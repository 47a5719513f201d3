//! Login and signup modals, header buttons, logout.

use cg_site_core::notify::error_message;
use cg_site_core::{Notifier, Session, SessionError};
use std::rc::Rc;
use tracing::debug;

use crate::chat_ui;
use crate::dom::{self, Elements, add_class, remove_class};
use crate::effects;
use crate::listeners::{listen_forever, on_click, on_click_async};
use crate::state::Shared;

pub fn bind(shared: &Rc<Shared>) {
    let els = &shared.els;

    let show = |trigger: &web_sys::HtmlElement, modal: &web_sys::Element| {
        let modal = modal.clone();
        on_click!(trigger, move |_| add_class(&modal, "active"));
    };
    show(&els.login_btn, &els.login_modal);
    show(&els.signup_btn, &els.signup_modal);

    let hide = |trigger: &web_sys::HtmlElement, modal: &web_sys::Element| {
        let modal = modal.clone();
        on_click!(trigger, move |_| remove_class(&modal, "active"));
    };
    hide(&els.close_login_modal, &els.login_modal);
    hide(&els.close_signup_modal, &els.signup_modal);

    let switch = |trigger: &web_sys::HtmlElement, from: &web_sys::Element, to: &web_sys::Element| {
        let (from, to) = (from.clone(), to.clone());
        listen_forever(trigger.as_ref(), "click", move |event| {
            event.prevent_default();
            remove_class(&from, "active");
            add_class(&to, "active");
        });
    };
    switch(&els.switch_to_signup, &els.login_modal, &els.signup_modal);
    switch(&els.switch_to_login, &els.signup_modal, &els.login_modal);

    {
        let shared = shared.clone();
        listen_forever(els.login_form.as_ref(), "submit", move |event| {
            event.prevent_default();
            let shared = shared.clone();
            wasm_bindgen_futures::spawn_local(async move { login(&shared).await });
        });
    }
    {
        let shared = shared.clone();
        listen_forever(els.signup_form.as_ref(), "submit", move |event| {
            event.prevent_default();
            let shared = shared.clone();
            wasm_bindgen_futures::spawn_local(async move { signup(&shared).await });
        });
    }

    on_click_async!(els.logout_btn, shared, logout);
}

/// Reflect the session in the header and footer.
pub fn observe(shared: &Rc<Shared>) {
    let els = shared.els.clone();
    shared.sessions.on_change(move |session| update(&els, session));
}

pub fn update(els: &Elements, session: Option<&Session>) {
    let (guest, member) = if session.is_some() {
        ("none", "inline-block")
    } else {
        ("inline-block", "none")
    };
    dom::set_display(&els.login_btn, guest);
    dom::set_display(&els.signup_btn, guest);
    dom::set_display(&els.logout_btn, member);
    let admin = if session.is_some_and(Session::is_admin) {
        "inline-block"
    } else {
        "none"
    };
    dom::set_display(&els.admin_link, admin);
    effects::update_footer_user(els, session.map(|s| s.user.username.as_str()));
}

async fn login(shared: &Rc<Shared>) {
    let els = &shared.els;
    let result = shared
        .sessions
        .login(&els.login_email.value(), &els.login_password.value())
        .await;
    if authenticated(shared, result) {
        remove_class(&els.login_modal, "active");
        els.login_form.reset();
        on_signed_in(shared).await;
    }
}

async fn signup(shared: &Rc<Shared>) {
    let els = &shared.els;
    let result = shared
        .sessions
        .signup(
            &els.signup_username.value(),
            &els.signup_email.value(),
            &els.signup_password.value(),
        )
        .await;
    if authenticated(shared, result) {
        remove_class(&els.signup_modal, "active");
        els.signup_form.reset();
        on_signed_in(shared).await;
    }
}

fn authenticated(shared: &Shared, result: Result<Session, SessionError>) -> bool {
    match result {
        Ok(_) => true,
        // backend failures are already reported by the session manager
        Err(err @ SessionError::MissingField(_)) => {
            shared.notifier.notify(&error_message(&err));
            false
        }
        Err(SessionError::Backend(err)) => {
            debug!(target: "cg::session", "authentication rejected: {}", err);
            false
        }
    }
}

async fn on_signed_in(shared: &Rc<Shared>) {
    shared.cart.initialize().await;
    chat_ui::start(shared).await;
}

async fn logout(shared: &Rc<Shared>) {
    shared.sessions.logout();
    chat_ui::hide(&shared.els);
    shared.cart.initialize().await;
}
