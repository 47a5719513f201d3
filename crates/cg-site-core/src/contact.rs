use cg_api_types::ContactRequest;
use cg_backend::Backend;
use tracing::warn;

use crate::notify::Notifier;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

/// Send the contact form. Returns `true` when the caller should reset it.
pub async fn transmit(backend: &dyn Backend, notifier: &dyn Notifier, form: &ContactForm) -> bool {
    if !form.is_complete() {
        notifier.notify("// Transmission failed");
        return false;
    }
    let request = ContactRequest {
        name: form.name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        message: form.message.clone(),
    };
    match backend.send_contact(&request).await {
        Ok(()) => {
            notifier.notify("// Message transmitted");
            true
        }
        Err(err) => {
            warn!(target: "cg::contact", "contact submission failed: {}", err);
            notifier.notify("// Transmission failed");
            false
        }
    }
}
