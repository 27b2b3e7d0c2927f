//! Blockchain provider port
//!
//! The state layer only needs a handful of things from a node: a polling
//! interval to configure, block-event listening it can switch on and off, and
//! the transaction count used to seed nonces. Block events themselves are
//! consumed elsewhere.

pub mod mock;
pub mod offline;

pub use mock::{MockProvider, MockProviderConfig};
pub use offline::OfflineProvider;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::types::{Address, Network};

#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    fn polling_interval(&self) -> Duration;

    fn set_polling_interval(&self, interval: Duration);

    /// Begin listening for new blocks; calling this while listening is allowed
    async fn start_block_events(&self, network: Network) -> Result<()>;

    async fn stop_block_events(&self) -> Result<()>;

    /// Number of transactions `address` has sent on `network`
    async fn transaction_count(&self, address: &Address, network: Network) -> Result<u64>;
}
