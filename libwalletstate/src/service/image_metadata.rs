use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::ImageMetadata;

/// Image metadata cache creators
///
/// The on-disk copy is best-effort: read and write failures are logged and
/// the in-memory cache carries on.
#[derive(Clone)]
pub struct ImageMetadataService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
}

impl ImageMetadataService {
    pub fn new(store: Arc<Store<AppState>>, storage: Arc<dyn SettingsStorage>) -> Self {
        Self { store, storage }
    }

    pub async fn load(&self) -> Result<()> {
        let key = StorageKey::global(keys::IMAGE_METADATA);
        match storage::load(&*self.storage, &key, versions::IMAGE_METADATA).await {
            Ok(Some(entries)) => self.store.dispatch(Action::ImageMetadataLoaded(entries))?,
            Ok(None) => {}
            Err(e) => warn!("Failed to read image metadata cache: {}", e),
        }
        Ok(())
    }

    pub async fn merge(&self, id: &str, metadata: ImageMetadata) -> Result<()> {
        self.store.dispatch(Action::ImageMetadataMerged {
            id: id.to_string(),
            metadata,
        })?;
        self.persist().await;
        Ok(())
    }

    pub async fn prune(&self, ids: Vec<String>) -> Result<()> {
        self.store.dispatch(Action::ImageMetadataPruned(ids))?;
        self.persist().await;
        Ok(())
    }

    async fn persist(&self) {
        let state = self.store.state();
        let key = StorageKey::global(keys::IMAGE_METADATA);
        if let Err(e) = storage::save(
            &*self.storage,
            &key,
            versions::IMAGE_METADATA,
            &state.image_metadata.entries,
        )
        .await
        {
            warn!("Failed to write image metadata cache: {}", e);
        }
    }
}
