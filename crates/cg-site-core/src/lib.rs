//! Runtime-agnostic core of the Cyber-Grid site.
//!
//! Everything here runs the same natively and in the browser: the browser
//! shell supplies storage, backend, and notifier implementations and this
//! crate drives them.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod contact;
pub mod effects;
pub mod lifecycle;
pub mod notify;
pub mod router;
pub mod session;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use cart::{CheckoutOutcome, LoadoutManager};
pub use catalog::{Catalog, CatalogSource, GridKind, GridState};
pub use config::{ConfigError, SiteConfig};
pub use lifecycle::Disposer;
pub use notify::Notifier;
pub use router::{Resolution, Route, Router, ViewHost, ViewId};
pub use session::{Session, SessionError, SessionManager};
