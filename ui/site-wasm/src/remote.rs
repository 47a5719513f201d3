//! Realtime cart mirror on the Firebase Realtime Database REST API.
//!
//! Reads and writes use plain `GET`/`PUT` on `<root>/loadouts/<user>.json`;
//! live updates come from the same URL as a server-sent event stream.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use cg_storage::{RemoteCartStore, RemoteListener, Subscription, VersionedLoadout, remote_cart_key};
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventSource, MessageEvent};

pub struct FirebaseMirror {
    root: String,
}

/// Payload of a `put` event from the streaming endpoint.
#[derive(Debug, Deserialize)]
struct StreamPut {
    path: String,
    data: Value,
}

impl FirebaseMirror {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    fn url(&self, user_key: &str) -> String {
        format!("{}/{}.json", self.root, remote_cart_key(user_key))
    }
}

async fn fetch_value(url: &str) -> Result<Option<VersionedLoadout>> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|err| anyhow!("mirror read failed: {err}"))?;
    if !resp.ok() {
        bail!("mirror read failed with status {}", resp.status());
    }
    let value: Option<VersionedLoadout> = resp
        .json()
        .await
        .map_err(|err| anyhow!("mirror value unreadable: {err}"))?;
    Ok(value)
}

#[async_trait(?Send)]
impl RemoteCartStore for FirebaseMirror {
    async fn load(&self, user_key: &str) -> Result<Option<VersionedLoadout>> {
        fetch_value(&self.url(user_key)).await
    }

    async fn store(&self, user_key: &str, value: &VersionedLoadout) -> Result<()> {
        let resp = Request::put(&self.url(user_key))
            .json(value)
            .map_err(|err| anyhow!("mirror value not encodable: {err}"))?
            .send()
            .await
            .map_err(|err| anyhow!("mirror write failed: {err}"))?;
        if !resp.ok() {
            bail!("mirror write failed with status {}", resp.status());
        }
        Ok(())
    }

    fn subscribe(&self, user_key: &str, listener: RemoteListener) -> Result<Subscription> {
        let url = self.url(user_key);
        let source = EventSource::new(&url).map_err(|err| anyhow!("EventSource failed: {err:?}"))?;

        let on_put = {
            let url = url.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let Some(raw) = event.data().as_string() else {
                    return;
                };
                let put: StreamPut = match serde_json::from_str(&raw) {
                    Ok(put) => put,
                    Err(err) => {
                        warn!(target: "cg::remote", "unreadable stream event: {}", err);
                        return;
                    }
                };
                if event.type_() == "put" && put.path == "/" {
                    match serde_json::from_value::<Option<VersionedLoadout>>(put.data) {
                        Ok(value) => listener(value),
                        Err(err) => warn!(target: "cg::remote", "unreadable mirror value: {}", err),
                    }
                    return;
                }
                // partial update: re-read the whole value
                debug!(target: "cg::remote", path = %put.path, "partial mirror update");
                let url = url.clone();
                let listener = listener.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match fetch_value(&url).await {
                        Ok(value) => listener(value),
                        Err(err) => warn!(target: "cg::remote", "{}", err),
                    }
                });
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        for event in ["put", "patch"] {
            if let Err(err) = source.add_event_listener_with_callback(event, on_put.as_ref().unchecked_ref()) {
                source.close();
                bail!("stream listener failed: {err:?}");
            }
        }

        debug!(target: "cg::remote", user = user_key, "mirror subscription opened");
        Ok(Subscription::new(move || {
            source.close();
            drop(on_put);
        }))
    }
}
