//! Event listener registration.
//!
//! Shell listeners live for the whole page and are leaked with `forget`.
//! View listeners are returned as guards and held by the view's disposer so
//! the next navigation removes them.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

/// Removes its listener when dropped.
pub struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    callback: Option<Closure<dyn FnMut(Event)>>,
}

impl ListenerGuard {
    /// Keep the listener for the lifetime of the page.
    pub fn forget(mut self) {
        if let Some(callback) = self.callback.take() {
            callback.forget();
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(callback) = &self.callback {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, callback.as_ref().unchecked_ref());
        }
    }
}

pub fn listen<F>(target: &EventTarget, event: &'static str, handler: F) -> ListenerGuard
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if let Err(err) = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
        tracing::warn!(target: "cg::dom", event, "addEventListener failed: {:?}", err);
    }
    ListenerGuard {
        target: target.clone(),
        event,
        callback: Some(callback),
    }
}

/// Listen for the lifetime of the page.
pub fn listen_forever<F>(target: &EventTarget, event: &'static str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    listen(target, event, handler).forget();
}

/// Attach a click handler that runs an async task per click.
macro_rules! on_click_async {
    ($el:expr, $ctx:expr, $handler:expr) => {{
        let ctx = $ctx.clone();
        $crate::listeners::listen_forever($el.as_ref(), "click", move |_| {
            let ctx = ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&ctx).await;
            });
        });
    }};
}

/// Attach a synchronous click handler.
macro_rules! on_click {
    ($el:expr, $handler:expr) => {{
        $crate::listeners::listen_forever($el.as_ref(), "click", $handler);
    }};
}

pub(crate) use {on_click, on_click_async};
