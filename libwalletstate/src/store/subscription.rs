use std::sync::Weak;

pub(crate) trait ListenerRegistry: Send + Sync {
    fn remove(&self, id: u64);
}

/// RAII guard for a store listener
///
/// Dropping the guard unsubscribes. A guard that outlives its store does
/// nothing on drop.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<dyn ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: Weak<dyn ListenerRegistry>) -> Self {
        Self { id, registry }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
