//! Cache of remote image dimensions and dominant colors
//!
//! No eviction: entries are overwritten by merges and removed by prunes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Action, Reduce};
use crate::types::ImageMetadata;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadataState {
    pub entries: BTreeMap<String, ImageMetadata>,
}

impl ImageMetadataState {
    pub fn get(&self, id: &str) -> Option<&ImageMetadata> {
        self.entries.get(id)
    }
}

impl Reduce for ImageMetadataState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::ImageMetadataLoaded(entries) => Some(Self {
                entries: entries.clone(),
            }),
            Action::ImageMetadataMerged { id, metadata } => {
                let mut entries = self.entries.clone();
                entries.insert(id.clone(), metadata.clone());
                Some(Self { entries })
            }
            Action::ImageMetadataPruned(ids) => {
                let mut entries = self.entries.clone();
                entries.retain(|id, _| !ids.contains(id));
                (entries.len() != self.entries.len()).then_some(Self { entries })
            }
            _ => None,
        }
    }
}
