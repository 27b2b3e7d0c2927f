//! Observable state store
//!
//! A [`Store`] owns one immutable snapshot of some state `S` and replaces it
//! wholesale on every dispatch. State types implement [`Reduce`]: a pure
//! transition from `(state, action)` to the next state.
//!
//! # Invariants
//!
//! 1. A published snapshot is never mutated; readers holding an `Arc<S>` keep
//!    seeing the value they read.
//! 2. Dispatches are serialized. The dispatch lock is held only while reducing
//!    and swapping the snapshot, never while listeners run.
//! 3. Every successful dispatch notifies each listener exactly once, in
//!    registration order, after the new snapshot is visible. A listener is
//!    handed the snapshot published at the moment it is called, so the last
//!    value any listener sees is the one `state()` returns.
//! 4. A panicking transition leaves the snapshot untouched and notifies nobody.
//! 5. Dropping a [`Subscription`] removes its listener before the next
//!    notification round.

pub mod action;
mod subscription;

pub use action::Action;
pub use subscription::Subscription;

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{trace, warn};

use crate::error::DispatchError;
use self::subscription::ListenerRegistry;

/// A pure state transition
pub trait Reduce: Clone + Send + Sync + 'static {
    type Action: Debug;

    /// Returns the next state, or `None` when the action is not recognized
    /// or changes nothing.
    fn reduce(&self, action: &Self::Action) -> Option<Self>;

    /// Total form of [`Reduce::reduce`]: unrecognized actions yield a copy of
    /// the input.
    fn transition(&self, action: &Self::Action) -> Self {
        self.reduce(action).unwrap_or_else(|| self.clone())
    }

    /// Names of the parts that differ between two snapshots, for tracing
    fn changed_parts(_prev: &Self, _next: &Self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// Apply `action` to one shared slot
///
/// Hands back the very same `Arc` when the slot does not react, so unchanged
/// slots stay pointer-equal across snapshots.
pub fn step<S: Reduce>(slot: &Arc<S>, action: &S::Action) -> Arc<S> {
    match slot.reduce(action) {
        Some(next) => Arc::new(next),
        None => Arc::clone(slot),
    }
}

type Listener<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

struct Listeners<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener<S>)>>,
}

impl<S> Listeners<S> {
    fn snapshot(&self) -> Vec<Listener<S>> {
        lock(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

impl<S: Send + Sync + 'static> ListenerRegistry for Listeners<S> {
    fn remove(&self, id: u64) {
        lock(&self.entries).retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Serialized, observable container for a snapshot of `S`
///
/// Shared as `Arc<Store<S>>`; there is no global instance.
pub struct Store<S: Reduce> {
    current: RwLock<Arc<S>>,
    dispatch_lock: Mutex<()>,
    listeners: Arc<Listeners<S>>,
}

impl<S: Reduce> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            dispatch_lock: Mutex::new(()),
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The currently published snapshot
    pub fn state(&self) -> Arc<S> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reduce `action` into a new snapshot, publish it, then notify listeners
    ///
    /// Listeners run on the calling thread after the dispatch lock is
    /// released, so a listener may dispatch again. That nested dispatch
    /// finishes its own notification round before this one continues, and
    /// the rest of this round then sees the nested result.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TransitionPanicked`] if the transition
    /// panics. The previous snapshot stays published.
    pub fn dispatch(&self, action: S::Action) -> Result<(), DispatchError> {
        {
            let _guard = lock(&self.dispatch_lock);
            let prev = self.state();

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| prev.reduce(&action)));
            let next = match outcome {
                Ok(Some(next)) => Arc::new(next),
                Ok(None) => Arc::clone(&prev),
                Err(payload) => {
                    let error = DispatchError::TransitionPanicked {
                        action: format!("{:?}", action),
                        message: panic_message(payload.as_ref()),
                    };
                    warn!("{}", error);
                    return Err(error);
                }
            };

            if tracing::enabled!(tracing::Level::TRACE) {
                trace!(
                    action = ?action,
                    changed = ?S::changed_parts(&prev, &next),
                    "dispatched"
                );
            }

            *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        }

        for listener in self.listeners.snapshot() {
            listener(&self.state());
        }

        Ok(())
    }

    /// Register a listener called with every newly published snapshot
    ///
    /// The listener stays registered for as long as the returned guard lives.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners.entries).push((id, Arc::new(listener)));

        let registry: Arc<dyn ListenerRegistry> = self.listeners.clone();
        Subscription::new(id, Arc::downgrade(&registry))
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners.entries).len()
    }
}

impl<S: Reduce + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
