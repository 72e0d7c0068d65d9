use std::sync::Arc;

use katha_core::model::Route;
use tokio::sync::watch;
use tracing::debug;

/// Current view of the client. Front ends subscribe to follow forced
/// navigation such as the redirect to login after a 401.
#[derive(Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Navigator {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.tx.send_replace(route);
        if previous != route {
            debug!(from = %previous, to = %route, "navigated");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_core::model::ChapterId;

    #[tokio::test]
    async fn subscribers_observe_navigation() {
        let nav = Navigator::default();
        let mut rx = nav.subscribe();

        nav.navigate(Route::Chapter(ChapterId::new(4)));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Route::Chapter(ChapterId::new(4)));
        assert_eq!(nav.current(), Route::Chapter(ChapterId::new(4)));
    }
}
