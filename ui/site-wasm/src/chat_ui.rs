//! Chat widget.
//!
//! Shown only to signed-in visitors. Each visitor message gets a scripted
//! reply after a short pause; both sides are stored server-side.

use cg_api_types::ChatMessage;
use cg_site_core::chat::{ChatAssistant, ChatEffect};
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use crate::dom::{self, Elements, add_class, remove_class, set_text};
use crate::effects;
use crate::listeners::{listen_forever, on_click};
use crate::state::Shared;

/// Show the widget and replay the visitor's stored history.
pub async fn start(shared: &Rc<Shared>) {
    let els = &shared.els;
    dom::set_display(&els.chatbot_container, "flex");
    els.chat_messages.set_inner_html("");
    for message in shared.chat.load_history().await {
        display(els, &message);
    }
}

pub fn hide(els: &Elements) {
    dom::set_display(&els.chatbot_container, "none");
    remove_class(&els.chat_window, "open");
}

pub fn bind(shared: &Rc<Shared>) {
    let els = &shared.els;
    for trigger in [&els.toggle_chat, &els.cat_avatar] {
        let window = els.chat_window.clone();
        on_click!(trigger, move |_| {
            let _ = window.class_list().toggle("open");
        });
    }
    {
        let window = els.chat_window.clone();
        on_click!(els.close_chat, move |_| remove_class(&window, "open"));
    }
    {
        let shared = shared.clone();
        on_click!(els.send_chat, move |_| send(&shared));
    }
    {
        let shared = shared.clone();
        listen_forever(els.chat_input.as_ref(), "keypress", move |event| {
            if event.dyn_ref::<KeyboardEvent>().is_some_and(|key| key.key() == "Enter") {
                send(&shared);
            }
        });
    }
}

fn send(shared: &Rc<Shared>) {
    let Some(message) = shared.chat.accept(&shared.els.chat_input.value()) else {
        return;
    };
    shared.els.chat_input.set_value("");
    display(&shared.els, &message);

    let shared = shared.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let reply = shared.chat.reply_to(&message.message);
        shared.chat.record(message).await;
        if reply.effect == ChatEffect::EasterEgg {
            effects::hue_flash(&shared.els);
        }
        TimeoutFuture::new(shared.config.chat_reply_delay_ms).await;
        let bot = ChatAssistant::bot_message(&reply);
        display(&shared.els, &bot);
        shared.chat.record(bot).await;
    });
}

fn display(els: &Elements, message: &ChatMessage) {
    let Ok(bubble) = dom::create_element("div") else {
        return;
    };
    add_class(&bubble, "chat-message");
    add_class(&bubble, message.sender.as_str());
    set_text(&bubble, &message.message);
    if els.chat_messages.append_child(&bubble).is_ok() {
        els.chat_messages.set_scroll_top(els.chat_messages.scroll_height());
    }
}
