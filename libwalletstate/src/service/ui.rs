//! UI event translation
//!
//! Each event maps 1:1 onto an action. The keyboard height is also cached so
//! screens can be laid out before the keyboard first appears; that cache is
//! best-effort.

use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};

#[derive(Clone)]
pub struct UiService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
}

impl UiService {
    pub fn new(store: Arc<Store<AppState>>, storage: Arc<dyn SettingsStorage>) -> Self {
        Self { store, storage }
    }

    pub async fn keyboard_shown(&self, height: f64) -> Result<()> {
        self.store.dispatch(Action::KeyboardShown { height })?;

        let key = StorageKey::global(keys::KEYBOARD_HEIGHT);
        if let Err(e) = storage::save(&*self.storage, &key, versions::GLOBAL, &height).await {
            warn!("Failed to cache keyboard height: {}", e);
        }
        Ok(())
    }

    pub fn keyboard_hidden(&self) -> Result<()> {
        self.store.dispatch(Action::KeyboardHidden)?;
        Ok(())
    }

    /// Restore the last cached keyboard height, if any
    pub async fn restore_keyboard_height(&self) -> Result<()> {
        let key = StorageKey::global(keys::KEYBOARD_HEIGHT);
        match storage::load::<f64>(&*self.storage, &key, versions::GLOBAL).await {
            Ok(Some(height)) => {
                self.store.dispatch(Action::KeyboardHeightRestored { height })?;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read cached keyboard height: {}", e),
        }
        Ok(())
    }

    pub fn open_modal(&self) -> Result<()> {
        self.store.dispatch(Action::ModalOpened)?;
        Ok(())
    }

    pub fn close_modal(&self) -> Result<()> {
        self.store.dispatch(Action::ModalClosed)?;
        Ok(())
    }

    pub fn update_swipe_velocity(&self, velocity: f64) -> Result<()> {
        self.store.dispatch(Action::SwipeVelocityUpdated(velocity))?;
        Ok(())
    }

    pub fn set_wallet_ready(&self, ready: bool) -> Result<()> {
        self.store.dispatch(Action::WalletReadyChanged(ready))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn service(storage: Arc<MemoryStorage>) -> (UiService, Arc<Store<AppState>>) {
        let store = Arc::new(Store::new(AppState::default()));
        (UiService::new(Arc::clone(&store), storage), store)
    }

    #[tokio::test]
    async fn test_keyboard_height_survives_restart() {
        let storage = Arc::new(MemoryStorage::new());
        let (ui, store) = service(storage.clone());
        ui.keyboard_shown(301.0).await.unwrap();
        ui.keyboard_hidden().unwrap();
        assert!(!store.state().keyboard.visible);

        let (restarted, store) = service(storage);
        restarted.restore_keyboard_height().await.unwrap();
        assert_eq!(store.state().keyboard.last_known_height, Some(301.0));
        assert!(!store.state().keyboard.visible);
    }

    #[tokio::test]
    async fn test_keyboard_shown_tolerates_storage_failure() {
        let (ui, store) = service(Arc::new(MemoryStorage::read_only()));
        ui.keyboard_shown(250.0).await.unwrap();
        assert!(store.state().keyboard.visible);
        assert_eq!(store.state().keyboard.height, 250.0);
    }

    #[tokio::test]
    async fn test_restore_without_cache_is_noop() {
        let (ui, store) = service(Arc::new(MemoryStorage::new()));
        let before = store.state();
        ui.restore_keyboard_height().await.unwrap();
        assert!(Arc::ptr_eq(&before.keyboard, &store.state().keyboard));
    }

    #[test]
    fn test_modal_swipe_readiness() {
        let (ui, store) = service(Arc::new(MemoryStorage::new()));
        ui.open_modal().unwrap();
        ui.update_swipe_velocity(3.25).unwrap();
        ui.set_wallet_ready(true).unwrap();

        let state = store.state();
        assert!(state.modal.visible);
        assert_eq!(state.swipe.velocity, 3.25);
        assert!(state.readiness.wallet_ready);

        ui.close_modal().unwrap();
        assert!(!store.state().modal.visible);
    }
}
