//! Path to view routing with access gates and per-view teardown.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

use crate::lifecycle::Disposer;
use crate::notify::Notifier;
use crate::session::{Session, SessionManager};

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Home,
    AssetStore,
    AiProjects,
    Contact,
    Admin,
}

impl ViewId {
    /// Text shown in the footer's route indicator.
    pub fn footer_label(self) -> &'static str {
        match self {
            ViewId::Home => "HOME",
            ViewId::AssetStore => "ASSET_STORE",
            ViewId::AiProjects => "AI_PROJECTS",
            ViewId::Contact => "CONTACT",
            ViewId::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires any session.
    Protected,
    /// Requires a session whose user has the admin flag.
    AdminOnly,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub view: ViewId,
    pub access: Access,
}

pub static ROUTES: [Route; 5] = [
    Route {
        path: HOME_PATH,
        view: ViewId::Home,
        access: Access::Public,
    },
    Route {
        path: "/asset-store",
        view: ViewId::AssetStore,
        access: Access::Public,
    },
    Route {
        path: "/ai-projects",
        view: ViewId::AiProjects,
        access: Access::Public,
    },
    Route {
        path: "/contact",
        view: ViewId::Contact,
        access: Access::Public,
    },
    Route {
        path: "/admin",
        view: ViewId::Admin,
        access: Access::AdminOnly,
    },
];

fn home_route() -> &'static Route {
    &ROUTES[0]
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(&'static Route),
    Redirect {
        to: &'static str,
        notice: &'static str,
    },
}

/// Canonical route path for a location.
///
/// Pages opened from disk (`file:`) only keep their file name:
/// `index.html` is home and `x.html` is `/x`.
pub fn normalize_path(pathname: &str, protocol: &str) -> String {
    let mut path = if protocol == "file:" {
        let last = pathname.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("index.html");
        if last == "index.html" {
            HOME_PATH.to_owned()
        } else {
            format!("/{}", last.replacen(".html", "", 1))
        }
    } else {
        pathname.to_owned()
    };

    if path.is_empty() {
        path.push('/');
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Match a normalized path against the route table and apply access gates.
/// Unknown paths render home.
pub fn resolve(path: &str, session: Option<&Session>) -> Resolution {
    let route = ROUTES.iter().find(|r| r.path == path).unwrap_or_else(home_route);
    match (route.access, session) {
        (Access::Public, _) => Resolution::Render(route),
        (Access::Protected | Access::AdminOnly, None) => Resolution::Redirect {
            to: HOME_PATH,
            notice: "// Please login first",
        },
        (Access::AdminOnly, Some(s)) if !s.is_admin() => Resolution::Redirect {
            to: HOME_PATH,
            notice: "// Admin access only",
        },
        _ => Resolution::Render(route),
    }
}

/// Where views get rendered. The browser implementation swaps the root
/// container's markup and binds listeners; the returned disposer undoes the
/// bindings.
pub trait ViewHost {
    fn mount(&self, route: &'static Route) -> Disposer;
    fn push_history(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Loaded(ViewId),
}

struct Mounted {
    view: ViewId,
    disposer: Disposer,
}

pub struct Router<H: ViewHost> {
    host: H,
    session: SessionManager,
    notifier: Rc<dyn Notifier>,
    mounted: RefCell<Option<Mounted>>,
}

impl<H: ViewHost> Router<H> {
    pub fn new(host: H, session: SessionManager, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            host,
            session,
            notifier,
            mounted: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> RouterState {
        match self.mounted.borrow().as_ref() {
            Some(mounted) => RouterState::Loaded(mounted.view),
            None => RouterState::Idle,
        }
    }

    /// Render whatever the current location resolves to.
    pub fn route(&self, pathname: &str, protocol: &str) -> Resolution {
        let path = normalize_path(pathname, protocol);
        info!(target: "cg::router", %path, "navigating");
        let session = self.session.current();
        let resolution = resolve(&path, session.as_ref());
        match &resolution {
            Resolution::Render(route) => self.mount(route),
            Resolution::Redirect { to, notice } => {
                debug!(target: "cg::router", %path, to, "access denied, redirecting");
                self.host.push_history(to);
                if let Resolution::Render(target) = resolve(to, session.as_ref()) {
                    self.mount(target);
                }
                self.notifier.notify(notice);
            }
        }
        resolution
    }

    /// Push `url` onto history and route to it.
    pub fn navigate_to(&self, url: &str, protocol: &str) -> Resolution {
        self.host.push_history(url);
        let pathname = url.split(['?', '#']).next().unwrap_or(url);
        self.route(pathname, protocol)
    }

    fn mount(&self, route: &'static Route) {
        let previous = self.mounted.borrow_mut().take();
        if let Some(previous) = previous {
            debug!(target: "cg::router", view = ?previous.view, steps = previous.disposer.len(), "disposing view");
            previous.disposer.dispose();
        }
        let disposer = self.host.mount(route);
        *self.mounted.borrow_mut() = Some(Mounted {
            view: route.view,
            disposer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, RecordingNotifier, admin_user};
    use cg_storage::{InMemoryLocalStore, LocalStore, TOKEN_KEY, USER_KEY, save_json};

    #[derive(Default, Clone)]
    struct RecordingHost {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingHost {
        fn log(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl ViewHost for RecordingHost {
        fn mount(&self, route: &'static Route) -> Disposer {
            self.log.borrow_mut().push(format!("mount {}", route.path));
            let log = self.log.clone();
            let mut disposer = Disposer::new();
            disposer.push(move || log.borrow_mut().push(format!("dispose {}", route.path)));
            disposer
        }

        fn push_history(&self, path: &str) {
            self.log.borrow_mut().push(format!("push {path}"));
        }
    }

    struct Harness {
        local: Rc<InMemoryLocalStore>,
        notifier: Rc<RecordingNotifier>,
        sessions: SessionManager,
        router: Router<RecordingHost>,
    }

    fn harness() -> Harness {
        let local = Rc::new(InMemoryLocalStore::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let sessions = SessionManager::new(local.clone(), Rc::new(FakeBackend::default()), notifier.clone());
        let router = Router::new(RecordingHost::default(), sessions.clone(), notifier.clone());
        Harness {
            local,
            notifier,
            sessions,
            router,
        }
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path("/asset-store/", "https:"), "/asset-store");
        assert_eq!(normalize_path("/", "https:"), "/");
        assert_eq!(normalize_path("", "https:"), "/");
        assert_eq!(normalize_path("/home/me/site/index.html", "file:"), "/");
        assert_eq!(normalize_path("/home/me/site/contact.html", "file:"), "/contact");
        assert_eq!(normalize_path("/home/me/site/", "file:"), "/");
    }

    #[test]
    fn unknown_paths_render_home() {
        let resolution = resolve("/unknown", None);
        assert_eq!(resolution, Resolution::Render(&ROUTES[0]));
    }

    #[test]
    fn admin_gate_checks_session_then_flag() {
        assert_eq!(
            resolve("/admin", None),
            Resolution::Redirect {
                to: "/",
                notice: "// Please login first"
            }
        );

        let mut user = admin_user();
        user.is_admin = false;
        let visitor = Session {
            token: "t".into(),
            user,
        };
        assert_eq!(
            resolve("/admin", Some(&visitor)),
            Resolution::Redirect {
                to: "/",
                notice: "// Admin access only"
            }
        );

        let admin = Session {
            token: "t".into(),
            user: admin_user(),
        };
        assert!(matches!(resolve("/admin", Some(&admin)), Resolution::Render(r) if r.view == ViewId::Admin));
    }

    #[test]
    fn anonymous_admin_visit_lands_on_home_with_notice() {
        let h = harness();
        let resolution = h.router.route("/admin", "https:");

        assert!(matches!(resolution, Resolution::Redirect { .. }));
        assert_eq!(h.router.host().log(), vec!["push /", "mount /"]);
        assert_eq!(h.router.state(), RouterState::Loaded(ViewId::Home));
        assert_eq!(h.notifier.last().as_deref(), Some("// Please login first"));
    }

    #[test]
    fn restored_admin_reaches_the_panel() {
        let h = harness();
        h.local.set(TOKEN_KEY, "t").unwrap();
        save_json(h.local.as_ref(), USER_KEY, &admin_user()).unwrap();
        h.sessions.restore();

        h.router.route("/admin/", "https:");
        assert_eq!(h.router.state(), RouterState::Loaded(ViewId::Admin));
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn previous_view_is_disposed_before_the_next_mounts() {
        let h = harness();
        assert_eq!(h.router.state(), RouterState::Idle);

        h.router.route("/", "https:");
        h.router.navigate_to("/asset-store", "https:");
        h.router.navigate_to("/contact?ref=footer", "https:");

        assert_eq!(
            h.router.host().log(),
            vec![
                "mount /",
                "push /asset-store",
                "dispose /",
                "mount /asset-store",
                "push /contact?ref=footer",
                "dispose /asset-store",
                "mount /contact",
            ]
        );
        assert_eq!(h.router.state(), RouterState::Loaded(ViewId::Contact));
    }

    #[test]
    fn footer_labels_cover_every_route() {
        let labels: Vec<&str> = ROUTES.iter().map(|r| r.view.footer_label()).collect();
        assert_eq!(labels, vec!["HOME", "ASSET_STORE", "AI_PROJECTS", "CONTACT", "ADMIN"]);
    }
}
