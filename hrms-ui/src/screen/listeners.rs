//! Global (screen-level) event listeners.
//!
//! Listeners are the ambient state a floating panel needs while it is open:
//! outside pointer-down, scroll and resize. Registration hands back a
//! [`ListenerGuard`]; dropping the guard unregisters the listener, so every
//! exit path of the owner releases it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use log::trace;

use crate::event::{EventKind, InputEvent, Propagation};

/// Callback invoked for a matching event.
pub type ListenerFn = dyn Fn(&InputEvent) -> Propagation + Send + Sync;

/// Dispatch phase. Capture listeners run before bubble listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

struct Entry {
    id: u64,
    kind: EventKind,
    phase: Phase,
    active: Arc<AtomicBool>,
    callback: Arc<ListenerFn>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Registry of screen-level listeners.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`. It stays registered until the returned
    /// guard is dropped.
    #[must_use = "the listener is removed when the guard is dropped"]
    pub fn register(
        &self,
        kind: EventKind,
        phase: Phase,
        callback: impl Fn(&InputEvent) -> Propagation + Send + Sync + 'static,
    ) -> ListenerGuard {
        let active = Arc::new(AtomicBool::new(true));
        let mut id = 0;

        if let Ok(mut inner) = self.inner.lock() {
            inner.next_id += 1;
            id = inner.next_id;
            inner.entries.push(Entry {
                id,
                kind,
                phase,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
            });
        }
        trace!("registered listener {id} for {kind:?} ({phase:?})");

        ListenerGuard {
            id,
            active,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered listeners for one event kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.entries.iter().filter(|e| e.kind == kind).count())
            .unwrap_or(0)
    }

    /// Deliver `event` to its listeners: capture phase first, then bubble, each
    /// in registration order.
    ///
    /// The registry lock is not held while callbacks run, so a callback may
    /// drop guards (its own included). A listener removed during a dispatch is
    /// not invoked later in that same dispatch.
    pub fn dispatch(&self, event: &InputEvent) -> Propagation {
        let kind = event.kind();
        let snapshot: Vec<(Arc<AtomicBool>, Arc<ListenerFn>)> = match self.inner.lock() {
            Ok(inner) => [Phase::Capture, Phase::Bubble]
                .into_iter()
                .flat_map(|phase| {
                    inner
                        .entries
                        .iter()
                        .filter(move |e| e.kind == kind && e.phase == phase)
                })
                .map(|e| (Arc::clone(&e.active), Arc::clone(&e.callback)))
                .collect(),
            Err(_) => return Propagation::Continue,
        };

        for (active, callback) in snapshot {
            if !active.load(Ordering::SeqCst) {
                continue;
            }
            if callback(event) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Continue
    }
}

/// Keeps a listener registered. Unregisters on drop.
pub struct ListenerGuard {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<Mutex<Inner>>,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(registry) = self.registry.upgrade()
            && let Ok(mut inner) = registry.lock()
        {
            inner.entries.retain(|e| e.id != self.id);
            trace!("unregistered listener {}", self.id);
        }
    }
}
