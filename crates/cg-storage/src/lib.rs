use anyhow::Result;
use async_trait::async_trait;
use cg_api_types::LoadoutEntry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

pub const CART_KEY: &str = "cyberGrid_Loadout";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Synchronous string key-value storage (browser `localStorage` or a test map).
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryLocalStore {
    values: RefCell<HashMap<String, String>>,
}

impl LocalStore for InMemoryLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read and decode a JSON value. Undecodable values are treated as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(target: "cg::storage", key, "discarding unreadable stored value: {}", err);
            None
        }
    }
}

pub fn save_json<T: Serialize>(store: &dyn LocalStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Location of a user's cart in the remote mirror.
pub fn remote_cart_key(user_key: &str) -> String {
    format!("loadouts/{user_key}")
}

/// Cart value as held by the remote mirror.
///
/// `version` increases with every local mutation. Older mirrors stored the
/// bare entry array; those decode as version 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RemoteLoadoutRepr")]
pub struct VersionedLoadout {
    pub version: u64,
    pub entries: Vec<LoadoutEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteLoadoutRepr {
    Versioned {
        version: u64,
        // the mirror drops empty arrays
        #[serde(default)]
        entries: Vec<LoadoutEntry>,
    },
    Legacy(Vec<LoadoutEntry>),
}

impl From<RemoteLoadoutRepr> for VersionedLoadout {
    fn from(repr: RemoteLoadoutRepr) -> Self {
        match repr {
            RemoteLoadoutRepr::Versioned { version, entries } => Self { version, entries },
            RemoteLoadoutRepr::Legacy(entries) => Self {
                version: 0,
                entries,
            },
        }
    }
}

pub type RemoteListener = Rc<dyn Fn(Option<VersionedLoadout>)>;

/// Handle to a live remote subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Optional per-user mirror of the cart (Firebase in the browser).
#[async_trait(?Send)]
pub trait RemoteCartStore {
    async fn load(&self, user_key: &str) -> Result<Option<VersionedLoadout>>;
    async fn store(&self, user_key: &str, value: &VersionedLoadout) -> Result<()>;
    /// Register for change notifications on `user_key`. The listener fires on
    /// every remote write, including the caller's own.
    fn subscribe(&self, user_key: &str, listener: RemoteListener) -> Result<Subscription>;
}

#[derive(Default)]
struct MirrorInner {
    values: HashMap<String, VersionedLoadout>,
    listeners: HashMap<u64, (String, RemoteListener)>,
    next_listener: u64,
}

/// Shared in-process mirror. Clones see the same data, which lets tests play
/// the part of a second device.
#[derive(Clone, Default)]
pub struct InMemoryRemoteCartStore {
    inner: Rc<RefCell<MirrorInner>>,
}

impl InMemoryRemoteCartStore {
    pub fn value(&self, user_key: &str) -> Option<VersionedLoadout> {
        self.inner.borrow().values.get(user_key).cloned()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn publish(&self, user_key: &str) {
        // listeners may call back into the mirror
        let (value, listeners) = {
            let inner = self.inner.borrow();
            let listeners: Vec<RemoteListener> = inner
                .listeners
                .values()
                .filter(|(key, _)| key == user_key)
                .map(|(_, listener)| listener.clone())
                .collect();
            (inner.values.get(user_key).cloned(), listeners)
        };
        for listener in listeners {
            listener(value.clone());
        }
    }
}

#[async_trait(?Send)]
impl RemoteCartStore for InMemoryRemoteCartStore {
    async fn load(&self, user_key: &str) -> Result<Option<VersionedLoadout>> {
        Ok(self.value(user_key))
    }

    async fn store(&self, user_key: &str, value: &VersionedLoadout) -> Result<()> {
        self.inner
            .borrow_mut()
            .values
            .insert(user_key.to_owned(), value.clone());
        self.publish(user_key);
        Ok(())
    }

    fn subscribe(&self, user_key: &str, listener: RemoteListener) -> Result<Subscription> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.insert(id, (user_key.to_owned(), listener));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.remove(&id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_api_types::RecordId;
    use std::cell::Cell;

    fn entry(id: i64) -> LoadoutEntry {
        LoadoutEntry {
            id: RecordId::Numeric(id),
            name: format!("item-{id}"),
            kind: "C++".to_owned(),
        }
    }

    #[test]
    fn json_helpers_skip_corrupt_values() {
        let store = InMemoryLocalStore::default();
        store.set(CART_KEY, "{not json").unwrap();
        assert!(load_json::<Vec<LoadoutEntry>>(&store, CART_KEY).is_none());

        save_json(&store, CART_KEY, &vec![entry(1)]).unwrap();
        let loaded: Vec<LoadoutEntry> = load_json(&store, CART_KEY).unwrap();
        assert_eq!(loaded, vec![entry(1)]);
    }

    #[test]
    fn legacy_array_decodes_as_version_zero() {
        let raw = r#"[{"id": 1, "name": "item-1", "type": "C++"}]"#;
        let value: VersionedLoadout = serde_json::from_str(raw).unwrap();
        assert_eq!(value.version, 0);
        assert_eq!(value.entries, vec![entry(1)]);

        let emptied: VersionedLoadout = serde_json::from_str(r#"{"version": 4}"#).unwrap();
        assert_eq!(emptied.version, 4);
        assert!(emptied.entries.is_empty());
    }

    #[test]
    fn remote_key_is_namespaced_per_user() {
        assert_eq!(remote_cart_key("17"), "loadouts/17");
    }

    #[tokio::test]
    async fn mirror_notifies_until_subscription_dropped() -> anyhow::Result<()> {
        let mirror = InMemoryRemoteCartStore::default();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let sub = mirror.subscribe(
            "u1",
            Rc::new(move |_| counter.set(counter.get() + 1)),
        )?;

        let value = VersionedLoadout {
            version: 1,
            entries: vec![entry(1)],
        };
        mirror.store("u1", &value).await?;
        mirror.store("u2", &value).await?;
        assert_eq!(seen.get(), 1);
        assert_eq!(mirror.load("u1").await?, Some(value.clone()));

        drop(sub);
        assert_eq!(mirror.listener_count(), 0);
        mirror.store("u1", &value).await?;
        assert_eq!(seen.get(), 1);
        Ok(())
    }
}
