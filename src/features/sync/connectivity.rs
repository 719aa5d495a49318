//! Network reachability tracking.
//!
//! The monitor is purely reactive: the host feeds it "became online" and
//! "became offline" signals and it fans real transitions out to observers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// Reachability as last reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    #[must_use]
    pub const fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Handle returned by [`ConnectivityMonitor::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(Connectivity) + Send + Sync>;

/// Tracks online/offline state and notifies observers on change.
///
/// Observers run synchronously on the signalling thread, in registration
/// order. They must not signal a transition themselves.
pub struct ConnectivityMonitor {
    online: AtomicBool,
    transition: Mutex<()>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
}

impl ConnectivityMonitor {
    /// Create a monitor seeded from the host's current connectivity signal.
    #[must_use]
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
            transition: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Best-known connectivity.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn current(&self) -> Connectivity {
        Connectivity::from_online(self.is_online())
    }

    /// Register an observer for future transitions.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(Connectivity) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Host signal: the network became reachable.
    pub fn set_online(&self) {
        self.signal(true);
    }

    /// Host signal: the network became unreachable.
    pub fn set_offline(&self) {
        self.signal(false);
    }

    /// Apply a host signal. Returns whether it was an actual transition.
    pub fn signal(&self, online: bool) -> bool {
        let _transition = self.transition.lock().unwrap_or_else(PoisonError::into_inner);

        if self.online.swap(online, Ordering::SeqCst) == online {
            return false;
        }

        let state = Connectivity::from_online(online);
        match state {
            Connectivity::Online => tracing::info!("network online"),
            Connectivity::Offline => tracing::warn!("network offline"),
        }

        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer(state);
        }

        true
    }
}
