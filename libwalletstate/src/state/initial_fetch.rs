use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

/// Progress of the first data load after launch
///
/// Moves forward one phase at a time and never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    #[default]
    Nothing,
    AssetsFetched,
    TransactionsFetched,
}

impl Reduce for FetchStage {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match (self, action) {
            (FetchStage::Nothing, Action::AssetsFetched) => Some(FetchStage::AssetsFetched),
            (FetchStage::AssetsFetched, Action::TransactionsFetched) => {
                Some(FetchStage::TransactionsFetched)
            }
            _ => None,
        }
    }
}
