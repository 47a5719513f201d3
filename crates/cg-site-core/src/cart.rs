//! The visitor's loadout (cart).
//!
//! State lives in local storage and, for signed-in visitors with a configured
//! mirror, in a per-user remote value. The remote value carries a version
//! counter: local mutations bump it and remote notifications older than the
//! local state are ignored, so a late echo cannot roll the cart back.

use cg_api_types::{LoadoutEntry, OrderRequest, RecordId};
use cg_backend::Backend;
use cg_storage::{
    CART_KEY, LocalStore, RemoteCartStore, Subscription, VersionedLoadout, load_json, save_json,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::notify::{Notifier, error_message};
use crate::session::SessionManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Empty,
    /// No session; the caller should open the login prompt.
    LoginRequired,
    Placed,
    Failed(String),
}

type CartObserver = Rc<dyn Fn(&[LoadoutEntry])>;

#[derive(Default)]
struct CartState {
    entries: Vec<LoadoutEntry>,
    version: u64,
    remote_user: Option<String>,
    subscription: Option<Subscription>,
}

struct CartInner {
    local: Rc<dyn LocalStore>,
    remote: Option<Rc<dyn RemoteCartStore>>,
    backend: Rc<dyn Backend>,
    notifier: Rc<dyn Notifier>,
    session: SessionManager,
    state: RefCell<CartState>,
    observers: RefCell<Vec<CartObserver>>,
}

#[derive(Clone)]
pub struct LoadoutManager {
    inner: Rc<CartInner>,
}

impl LoadoutManager {
    pub fn new(
        local: Rc<dyn LocalStore>,
        remote: Option<Rc<dyn RemoteCartStore>>,
        backend: Rc<dyn Backend>,
        notifier: Rc<dyn Notifier>,
        session: SessionManager,
    ) -> Self {
        Self {
            inner: Rc::new(CartInner {
                local,
                remote,
                backend,
                notifier,
                session,
                state: RefCell::new(CartState::default()),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn entries(&self) -> Vec<LoadoutEntry> {
        self.inner.state.borrow().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.inner.state.borrow().entries.iter().any(|e| &e.id == id)
    }

    pub fn version(&self) -> u64 {
        self.inner.state.borrow().version
    }

    /// Register a re-render callback, fired after every change of contents.
    pub fn on_change(&self, observer: impl Fn(&[LoadoutEntry]) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Load the local cart and, when signed in with a mirror configured,
    /// reconcile with the remote copy and follow its changes.
    ///
    /// Safe to call again after login or logout; the previous subscription
    /// is dropped first.
    pub async fn initialize(&self) {
        let stale = {
            let mut state = self.inner.state.borrow_mut();
            state.remote_user = None;
            state.subscription.take()
        };
        drop(stale);

        let local: Vec<LoadoutEntry> = load_json(self.inner.local.as_ref(), CART_KEY).unwrap_or_default();
        {
            let mut state = self.inner.state.borrow_mut();
            state.entries = local;
            state.version = 0;
        }

        if let (Some(session), Some(remote)) = (self.inner.session.current(), self.inner.remote.clone()) {
            let user_key = session.user_key();
            self.reconcile(remote.as_ref(), &user_key).await;
            let listener_target = Rc::downgrade(&self.inner);
            let subscription = remote.subscribe(
                &user_key,
                Rc::new(move |value| {
                    if let (Some(inner), Some(value)) = (listener_target.upgrade(), value) {
                        LoadoutManager { inner }.apply_remote(value);
                    }
                }),
            );
            let mut state = self.inner.state.borrow_mut();
            state.remote_user = Some(user_key);
            match subscription {
                Ok(subscription) => state.subscription = Some(subscription),
                Err(err) => warn!(target: "cg::cart", "remote cart subscription failed: {}", err),
            }
        }

        info!(target: "cg::cart", entries = self.len(), "loadout initialized");
        self.emit();
    }

    async fn reconcile(&self, remote: &dyn RemoteCartStore, user_key: &str) {
        match remote.load(user_key).await {
            Ok(Some(value)) => {
                debug!(target: "cg::cart", version = value.version, "adopting remote loadout");
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.entries = value.entries;
                    state.version = value.version;
                }
                self.save_local();
            }
            Ok(None) => {
                let seed = self.snapshot();
                if let Err(err) = remote.store(user_key, &seed).await {
                    warn!(target: "cg::cart", "failed to seed remote loadout: {}", err);
                }
            }
            Err(err) => warn!(target: "cg::cart", "remote loadout unavailable: {}", err),
        }
    }

    fn apply_remote(&self, value: VersionedLoadout) {
        {
            let mut state = self.inner.state.borrow_mut();
            if value.entries == state.entries {
                state.version = state.version.max(value.version);
                return;
            }
            if value.version < state.version {
                debug!(
                    target: "cg::cart",
                    remote = value.version,
                    local = state.version,
                    "ignoring stale remote loadout"
                );
                return;
            }
            state.entries = value.entries;
            state.version = value.version;
        }
        self.save_local();
        self.emit();
        self.inner.notifier.notify("// Loadout synced from another device");
    }

    /// Append an entry unless its id is already present. Returns whether it was added.
    pub async fn add(&self, entry: LoadoutEntry) -> bool {
        let name = entry.name.clone();
        {
            let mut state = self.inner.state.borrow_mut();
            if state.entries.iter().any(|e| e.id == entry.id) {
                return false;
            }
            state.entries.push(entry);
            state.version += 1;
        }
        self.persist().await;
        self.inner.notifier.notify(&format!("// {name} stored in memory"));
        true
    }

    pub async fn remove(&self, id: &RecordId) {
        {
            let mut state = self.inner.state.borrow_mut();
            let before = state.entries.len();
            state.entries.retain(|e| &e.id != id);
            if state.entries.len() != before {
                state.version += 1;
            }
        }
        self.persist().await;
    }

    pub async fn purge(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.entries.clear();
            state.version += 1;
        }
        self.persist().await;
        self.inner.notifier.notify("// Loadout purged");
    }

    pub async fn checkout(&self) -> CheckoutOutcome {
        if self.is_empty() {
            self.inner.notifier.notify("// Loadout is empty");
            return CheckoutOutcome::Empty;
        }
        let Some(session) = self.inner.session.current() else {
            self.inner.notifier.notify("// Please login to deploy");
            return CheckoutOutcome::LoginRequired;
        };

        let request = OrderRequest {
            product_ids: self.entries().into_iter().map(|e| e.id).collect(),
        };
        info!(target: "cg::cart", items = request.product_ids.len(), "submitting order");
        match self.inner.backend.create_order(&session.token, &request).await {
            Ok(()) => {
                self.inner.notifier.notify("// Order placed! Check your email.");
                self.purge().await;
                CheckoutOutcome::Placed
            }
            Err(err) => {
                let message = error_message(&err);
                self.inner.notifier.notify(&message);
                CheckoutOutcome::Failed(err.to_string())
            }
        }
    }

    fn snapshot(&self) -> VersionedLoadout {
        let state = self.inner.state.borrow();
        VersionedLoadout {
            version: state.version,
            entries: state.entries.clone(),
        }
    }

    fn save_local(&self) {
        let entries = self.entries();
        if let Err(err) = save_json(self.inner.local.as_ref(), CART_KEY, &entries) {
            warn!(target: "cg::cart", "failed to persist loadout locally: {}", err);
        }
    }

    // Local first, then the mirror. A failure between the two leaves them
    // divergent until the next initialize.
    async fn persist(&self) {
        self.save_local();
        self.emit();

        let remote_user = self.inner.state.borrow().remote_user.clone();
        if let (Some(remote), Some(user_key)) = (self.inner.remote.as_ref(), remote_user) {
            let snapshot = self.snapshot();
            if let Err(err) = remote.store(&user_key, &snapshot).await {
                warn!(target: "cg::cart", "failed to mirror loadout: {}", err);
            }
        }
    }

    fn emit(&self) {
        let entries = self.entries();
        let observers: Vec<CartObserver> = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, RecordingNotifier};
    use cg_api_types::User;
    use cg_backend::BackendError;
    use cg_storage::{InMemoryLocalStore, InMemoryRemoteCartStore};
    use proptest::prelude::*;
    use std::cell::Cell;

    fn entry(id: i64) -> LoadoutEntry {
        LoadoutEntry {
            id: RecordId::Numeric(id),
            name: format!("Asset {id}"),
            kind: "UE5 / C++".to_owned(),
        }
    }

    struct Device {
        local: Rc<InMemoryLocalStore>,
        backend: Rc<FakeBackend>,
        notifier: Rc<RecordingNotifier>,
        sessions: SessionManager,
        cart: LoadoutManager,
    }

    fn device(remote: Option<InMemoryRemoteCartStore>) -> Device {
        let local = Rc::new(InMemoryLocalStore::default());
        let backend = Rc::new(FakeBackend::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let sessions = SessionManager::new(local.clone(), backend.clone(), notifier.clone());
        let remote = remote.map(|r| Rc::new(r) as Rc<dyn RemoteCartStore>);
        let cart = LoadoutManager::new(local.clone(), remote, backend.clone(), notifier.clone(), sessions.clone());
        Device {
            local,
            backend,
            notifier,
            sessions,
            cart,
        }
    }

    fn sign_in(device: &Device, id: i64) {
        device.backend.auth_user.replace(Some(User {
            id: RecordId::Numeric(id),
            username: "neo".into(),
            email: "neo@grid.dev".into(),
            is_admin: false,
        }));
    }

    fn ids(cart: &LoadoutManager) -> Vec<String> {
        cart.entries().iter().map(|e| e.id.as_key()).collect()
    }

    #[tokio::test]
    async fn operations_match_an_ordered_unique_set() {
        let d = device(None);
        d.cart.initialize().await;

        assert!(d.cart.add(entry(3)).await);
        assert!(d.cart.add(entry(1)).await);
        assert!(!d.cart.add(entry(3)).await);
        assert!(d.cart.add(entry(2)).await);
        d.cart.remove(&RecordId::Text("1".into())).await;
        d.cart.remove(&RecordId::Numeric(42)).await;
        assert!(d.cart.add(entry(1)).await);
        assert_eq!(ids(&d.cart), vec!["3", "2", "1"]);

        d.cart.purge().await;
        assert!(d.cart.is_empty());
        assert!(d.cart.add(entry(5)).await);
        assert_eq!(ids(&d.cart), vec!["5"]);

        let stored: Vec<LoadoutEntry> = load_json(d.local.as_ref(), CART_KEY).unwrap();
        assert_eq!(stored, d.cart.entries());
    }

    #[tokio::test]
    async fn duplicate_add_changes_nothing_and_stays_quiet() {
        let d = device(None);
        d.cart.add(entry(7)).await;
        let version = d.cart.version();
        let messages = d.notifier.messages().len();

        assert!(!d.cart.add(entry(7)).await);
        assert_eq!(d.cart.version(), version);
        assert_eq!(d.notifier.messages().len(), messages);
        assert_eq!(d.notifier.last().as_deref(), Some("// Asset 7 stored in memory"));
    }

    #[tokio::test]
    async fn initialize_restores_local_cart_and_notifies_observers() {
        let d = device(None);
        save_json(d.local.as_ref(), CART_KEY, &vec![entry(1), entry(2)]).unwrap();
        let rendered = Rc::new(Cell::new(0usize));
        let seen = rendered.clone();
        d.cart.on_change(move |entries| seen.set(entries.len()));

        d.cart.initialize().await;
        assert_eq!(rendered.get(), 2);
        assert!(d.cart.contains(&RecordId::Text("2".into())));
    }

    #[tokio::test]
    async fn empty_checkout_issues_no_request() {
        let d = device(None);
        sign_in(&d, 1);
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();
        let before = d.backend.calls().len();

        assert_eq!(d.cart.checkout().await, CheckoutOutcome::Empty);
        assert_eq!(d.backend.calls().len(), before);
        assert_eq!(d.notifier.last().as_deref(), Some("// Loadout is empty"));
    }

    #[tokio::test]
    async fn anonymous_checkout_asks_for_login() {
        let d = device(None);
        d.cart.add(entry(1)).await;
        assert_eq!(d.cart.checkout().await, CheckoutOutcome::LoginRequired);
        assert!(d.backend.calls().is_empty());
        assert_eq!(d.cart.len(), 1);
        assert_eq!(d.notifier.last().as_deref(), Some("// Please login to deploy"));
    }

    #[tokio::test]
    async fn successful_checkout_submits_ids_and_clears_cart() {
        let d = device(None);
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();
        d.cart.add(entry(4)).await;
        d.cart.add(entry(9)).await;

        assert_eq!(d.cart.checkout().await, CheckoutOutcome::Placed);

        let orders = d.backend.orders.borrow();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, "token-1");
        assert_eq!(orders[0].1.product_ids, vec![RecordId::Numeric(4), RecordId::Numeric(9)]);
        assert!(d.cart.is_empty());
        let messages = d.notifier.messages();
        assert_eq!(
            &messages[messages.len() - 2..],
            &["// Order placed! Check your email.".to_owned(), "// Loadout purged".to_owned()]
        );
    }

    #[tokio::test]
    async fn failed_checkout_reports_server_error_verbatim() {
        let d = device(None);
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();
        d.cart.add(entry(4)).await;
        d.backend.fail(
            "create_order",
            BackendError::Status {
                status: 409,
                message: "Asset 4 already owned".into(),
            },
        );

        assert_eq!(
            d.cart.checkout().await,
            CheckoutOutcome::Failed("Asset 4 already owned".into())
        );
        assert_eq!(d.cart.len(), 1);
        assert_eq!(d.notifier.last().as_deref(), Some("// Error: Asset 4 already owned"));
    }

    #[tokio::test]
    async fn remote_value_wins_on_initialize() {
        let mirror = InMemoryRemoteCartStore::default();
        mirror
            .store("1", &VersionedLoadout { version: 6, entries: vec![entry(8)] })
            .await
            .unwrap();
        let d = device(Some(mirror.clone()));
        save_json(d.local.as_ref(), CART_KEY, &vec![entry(1)]).unwrap();
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();

        d.cart.initialize().await;

        assert_eq!(ids(&d.cart), vec!["8"]);
        assert_eq!(d.cart.version(), 6);
        let stored: Vec<LoadoutEntry> = load_json(d.local.as_ref(), CART_KEY).unwrap();
        assert_eq!(stored, vec![entry(8)]);
    }

    #[tokio::test]
    async fn local_cart_seeds_an_empty_mirror() {
        let mirror = InMemoryRemoteCartStore::default();
        let d = device(Some(mirror.clone()));
        save_json(d.local.as_ref(), CART_KEY, &vec![entry(1)]).unwrap();
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();

        d.cart.initialize().await;
        assert_eq!(mirror.value("1").map(|v| v.entries), Some(vec![entry(1)]));

        d.cart.add(entry(2)).await;
        let mirrored = mirror.value("1").unwrap();
        assert_eq!(mirrored.entries, d.cart.entries());
        assert_eq!(mirrored.version, d.cart.version());
    }

    #[tokio::test]
    async fn anonymous_visitors_never_touch_the_mirror() {
        let mirror = InMemoryRemoteCartStore::default();
        let d = device(Some(mirror.clone()));
        d.cart.initialize().await;
        d.cart.add(entry(1)).await;
        assert_eq!(mirror.listener_count(), 0);
        assert!(mirror.value("1").is_none());
    }

    #[tokio::test]
    async fn second_device_changes_propagate() {
        let mirror = InMemoryRemoteCartStore::default();
        let laptop = device(Some(mirror.clone()));
        let phone = device(Some(mirror.clone()));
        for d in [&laptop, &phone] {
            d.sessions.login("neo@grid.dev", "pw").await.unwrap();
            d.cart.initialize().await;
        }

        phone.cart.add(entry(3)).await;

        assert_eq!(ids(&laptop.cart), vec!["3"]);
        assert_eq!(
            laptop.notifier.last().as_deref(),
            Some("// Loadout synced from another device")
        );
        let stored: Vec<LoadoutEntry> = load_json(laptop.local.as_ref(), CART_KEY).unwrap();
        assert_eq!(stored, vec![entry(3)]);
    }

    #[tokio::test]
    async fn stale_remote_notifications_are_ignored() {
        let mirror = InMemoryRemoteCartStore::default();
        let d = device(Some(mirror.clone()));
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();
        d.cart.initialize().await;
        d.cart.add(entry(1)).await;
        d.cart.add(entry(2)).await;
        let version = d.cart.version();

        // a delayed write from an older state arrives after newer local edits
        mirror
            .store("1", &VersionedLoadout { version: version - 1, entries: vec![entry(1)] })
            .await
            .unwrap();

        assert_eq!(ids(&d.cart), vec!["1", "2"]);
        assert_ne!(d.notifier.last().as_deref(), Some("// Loadout synced from another device"));
    }

    #[tokio::test]
    async fn reinitialize_after_logout_drops_the_subscription() {
        let mirror = InMemoryRemoteCartStore::default();
        let d = device(Some(mirror.clone()));
        d.sessions.login("neo@grid.dev", "pw").await.unwrap();
        d.cart.initialize().await;
        assert_eq!(mirror.listener_count(), 1);

        d.sessions.logout();
        d.cart.initialize().await;
        assert_eq!(mirror.listener_count(), 0);

        d.cart.add(entry(5)).await;
        assert!(mirror.value("1").map(|v| v.entries.is_empty()).unwrap_or(true));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(RecordId),
        Remove(RecordId),
        Purge,
    }

    /// Small id space so adds collide and removes hit; `7` and `"7"` are the
    /// same record.
    fn record_id() -> impl Strategy<Value = RecordId> {
        prop_oneof![
            (0i64..6).prop_map(RecordId::Numeric),
            (0i64..6).prop_map(|n| RecordId::Text(n.to_string())),
        ]
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => record_id().prop_map(Op::Add),
            2 => record_id().prop_map(Op::Remove),
            1 => Just(Op::Purge),
        ]
    }

    proptest! {
        #[test]
        fn any_sequence_matches_an_ordered_unique_set(ops in prop::collection::vec(op(), 0..40)) {
            let d = device(None);
            let mut model: Vec<String> = Vec::new();

            futures::executor::block_on(async {
                d.cart.initialize().await;
                for op in &ops {
                    match op {
                        Op::Add(id) => {
                            let key = id.as_key();
                            let fresh = !model.contains(&key);
                            if fresh {
                                model.push(key.clone());
                            }
                            let added = d.cart.add(LoadoutEntry {
                                id: id.clone(),
                                name: format!("Asset {key}"),
                                kind: "AI".to_owned(),
                            })
                            .await;
                            assert_eq!(added, fresh);
                        }
                        Op::Remove(id) => {
                            model.retain(|key| *key != id.as_key());
                            d.cart.remove(id).await;
                        }
                        Op::Purge => {
                            model.clear();
                            d.cart.purge().await;
                        }
                    }
                }
            });

            prop_assert_eq!(ids(&d.cart), model);
            let stored: Vec<LoadoutEntry> = load_json(d.local.as_ref(), CART_KEY).unwrap_or_default();
            prop_assert_eq!(stored, d.cart.entries());
        }
    }
}
