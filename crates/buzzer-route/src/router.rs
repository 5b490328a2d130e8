//! The navigation collaborator.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// Performs navigation and reports where the viewer is.
///
/// The app's real router (browser history, a desktop shell, ...) implements
/// this. [`MemoryRouter`] is a self-contained implementation.
pub trait Router: Send + Sync + 'static {
    /// The path currently displayed.
    fn current_path(&self) -> String;

    /// Pushes a new path.
    fn navigate(&self, path: &str);

    /// A receiver that observes every path change, whoever caused it.
    fn subscribe(&self) -> watch::Receiver<String>;
}

impl<R: Router + ?Sized> Router for Arc<R> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn navigate(&self, path: &str) {
        (**self).navigate(path);
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        (**self).subscribe()
    }
}

/// An in-process router with a history stack.
///
/// Keeps two records: the current path (published on a watch channel) and
/// the list of [`navigate`](Router::navigate) calls. [`visit`](Self::visit)
/// changes the path without counting as a navigate call, which is how tests
/// model the viewer typing a URL.
#[derive(Debug)]
pub struct MemoryRouter {
    path: watch::Sender<String>,
    navigations: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            path: watch::Sender::new(initial.into()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    /// Moves to `path` as if the viewer had entered it.
    pub fn visit(&self, path: impl Into<String>) {
        self.path.send_replace(path.into());
    }

    /// Every path passed to [`navigate`](Router::navigate), oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn navigate(&self, path: &str) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        self.path.send_replace(path.to_string());
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        self.path.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_records_and_moves() {
        let router = MemoryRouter::new("/");
        router.navigate("/sign-in");
        assert_eq!(router.current_path(), "/sign-in");
        assert_eq!(router.navigations(), vec!["/sign-in".to_string()]);
    }

    #[test]
    fn test_visit_moves_without_recording() {
        let router = MemoryRouter::new("/");
        router.visit("/games");
        assert_eq!(router.current_path(), "/games");
        assert!(router.navigations().is_empty());
    }

    #[test]
    fn test_subscribe_sees_changes() {
        let router = MemoryRouter::new("/");
        let mut rx = router.subscribe();
        router.visit("/dashboard");
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "/dashboard");
    }

    #[test]
    fn test_arc_router_delegates() {
        let router = Arc::new(MemoryRouter::new("/"));
        let shared: Arc<MemoryRouter> = Arc::clone(&router);
        Router::navigate(&shared, "/users/1");
        assert_eq!(router.navigations(), vec!["/users/1".to_string()]);
    }
}
