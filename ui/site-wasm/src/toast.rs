use cg_site_core::Notifier;
use gloo_timers::callback::Timeout;
use gloo_utils::document;

/// Transient `.toast` elements appended to `<body>`.
pub struct ToastNotifier {
    duration_ms: u32,
}

impl ToastNotifier {
    pub fn new(duration_ms: u32) -> Self {
        Self { duration_ms }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, message: &str) {
        tracing::debug!(target: "cg::toast", "{}", message);
        let Ok(toast) = document().create_element("div") else {
            return;
        };
        toast.set_class_name("toast");
        toast.set_text_content(Some(message));
        let Some(body) = document().body() else {
            return;
        };
        if body.append_child(&toast).is_err() {
            return;
        }
        Timeout::new(self.duration_ms, move || toast.remove()).forget();
    }
}
