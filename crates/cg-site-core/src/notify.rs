/// Sink for short user-facing messages (toasts in the browser).
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Format a failure the way every call site reports it.
pub fn error_message(err: impl std::fmt::Display) -> String {
    format!("// Error: {err}")
}
