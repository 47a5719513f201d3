//! Visitor identity: restore, login, signup, logout.
//!
//! A restored session is trusted as-is. A revoked token only shows up when a
//! later authenticated request fails.

use cg_api_types::{AuthResponse, LoginRequest, SignupRequest, User};
use cg_backend::{Backend, BackendError};
use cg_storage::{LocalStore, TOKEN_KEY, USER_KEY, load_json, save_json};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};

use crate::notify::{Notifier, error_message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    /// Key of this visitor's cart in the remote mirror.
    pub fn user_key(&self) -> String {
        self.user.id.as_key()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

type SessionObserver = Rc<dyn Fn(Option<&Session>)>;

struct SessionInner {
    local: Rc<dyn LocalStore>,
    backend: Rc<dyn Backend>,
    notifier: Rc<dyn Notifier>,
    current: RefCell<Option<Session>>,
    observers: RefCell<Vec<SessionObserver>>,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Rc<SessionInner>,
}

impl SessionManager {
    pub fn new(local: Rc<dyn LocalStore>, backend: Rc<dyn Backend>, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                local,
                backend,
                notifier,
                current: RefCell::new(None),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Pick up the session cached by a previous visit.
    pub fn restore(&self) -> Option<Session> {
        let user: User = load_json(self.inner.local.as_ref(), USER_KEY)?;
        let token = self.inner.local.get(TOKEN_KEY).unwrap_or_default();
        let session = Session { token, user };
        info!(target: "cg::session", user = %session.user.username, "restored cached session");
        self.set_current(Some(session.clone()));
        Some(session)
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.current.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.current.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Register a callback fired after every identity change.
    pub fn on_change(&self, observer: impl Fn(Option<&Session>) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let request = LoginRequest {
            email: required("email", email)?,
            password: required("password", password)?,
        };
        let result = self.inner.backend.login(&request).await;
        self.finish_auth(result, "// Authentication successful")
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<Session, SessionError> {
        let request = SignupRequest {
            username: required("username", username)?,
            email: required("email", email)?,
            password: required("password", password)?,
        };
        let result = self.inner.backend.signup(&request).await;
        self.finish_auth(result, "// Registration successful")
    }

    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.inner.local.remove(key) {
                warn!(target: "cg::session", key, "failed to clear stored session: {}", err);
            }
        }
        self.set_current(None);
        self.inner.notifier.notify("// Disconnected");
    }

    fn finish_auth(
        &self,
        result: Result<AuthResponse, BackendError>,
        success: &str,
    ) -> Result<Session, SessionError> {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.inner.notifier.notify(&error_message(&err));
                return Err(err.into());
            }
        };

        let session = Session {
            token: response.token,
            user: response.user,
        };
        let local = self.inner.local.as_ref();
        if let Err(err) = local
            .set(TOKEN_KEY, &session.token)
            .and_then(|_| save_json(local, USER_KEY, &session.user))
        {
            warn!(target: "cg::session", "session not persisted: {}", err);
        }
        info!(target: "cg::session", user = %session.user.username, admin = session.user.is_admin, "authenticated");
        self.set_current(Some(session.clone()));
        self.inner.notifier.notify(success);
        Ok(session)
    }

    fn set_current(&self, session: Option<Session>) {
        *self.inner.current.borrow_mut() = session;
        let current = self.current();
        let observers: Vec<SessionObserver> = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(current.as_ref());
        }
    }
}

/// Reject blank input. Non-blank values are sent exactly as typed.
fn required(field: &'static str, value: &str) -> Result<String, SessionError> {
    if value.trim().is_empty() {
        Err(SessionError::MissingField(field))
    } else {
        Ok(value.to_owned())
    }
}
