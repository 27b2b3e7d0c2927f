//! Core domain types shared by the containers, ports and services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wallet account address
///
/// Stored exactly as supplied (checksummed addresses keep their casing for
/// display). Comparisons that cross a storage or provider boundary go through
/// [`Address::key`], which lowercases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for storage keys and account matching
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Supported EVM networks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Mainnet,
        Network::Ropsten,
        Network::Rinkeby,
        Network::Goerli,
        Network::Kovan,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
            Network::Goerli => 5,
            Network::Kovan => 42,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Kovan => "kovan",
        }
    }

    pub fn is_testnet(&self) -> bool {
        !matches!(self, Network::Mainnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid network: '{}'. Valid options: mainnet, ropsten, rinkeby, goerli, kovan",
                    s
                )
            })
    }
}

/// Currency used to display balances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NativeCurrency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Aud,
    Cad,
    Cny,
    Inr,
    Jpy,
    Krw,
    Rub,
    Try,
    Eth,
}

/// Interface language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "es_419")]
    Es,
    #[serde(rename = "fr_FR")]
    Fr,
    #[serde(rename = "de_DE")]
    De,
    #[serde(rename = "pt_BR")]
    Pt,
    #[serde(rename = "ja_JP")]
    Ja,
    #[serde(rename = "ko_KR")]
    Ko,
    #[serde(rename = "zh_CN")]
    Zh,
}

/// An approved wallet-connect session with a dapp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub peer_id: String,
    pub client_id: String,
    pub dapp_name: String,
    pub dapp_url: String,
    #[serde(default)]
    pub dapp_icon: Option<String>,
    pub account_address: Address,
    pub chain_id: u64,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is live only while its expiry is strictly after `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A session request awaiting user approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSessionRequest {
    pub peer_id: String,
    pub dapp_name: String,
    pub dapp_url: String,
    #[serde(default)]
    pub dapp_icon: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Cached metadata for a remote image (token logos, NFT previews)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAsset {
    pub unique_id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    /// Decimal string, never interpreted here
    pub balance: String,
}

/// One derived or imported account inside a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub index: u32,
    pub label: String,
    pub address: Address,
    #[serde(default)]
    pub avatar: Option<String>,
    pub color: u32,
    pub visible: bool,
}

/// A wallet as the account switcher sees it; secrets live elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub addresses: Vec<WalletAccount>,
    pub color: u32,
    #[serde(default)]
    pub imported: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub backed_up: bool,
}

impl Wallet {
    pub fn owns(&self, address: &Address) -> bool {
        self.addresses
            .iter()
            .any(|account| account.address.matches(address.as_str()))
    }

    /// First account the user has not hidden
    pub fn first_visible(&self) -> Option<&WalletAccount> {
        self.addresses.iter().find(|account| account.visible)
    }
}

/// Long-running wallet operation shown as a blocking overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletLoadingState {
    Creating,
    Importing,
    BackingUp,
    Restoring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub nonce: Option<u64>,
    pub network: Network,
    #[serde(default)]
    pub pending: bool,
}

/// Highest nonce among the transactions sent from `account`
///
/// Transactions without a nonce, and a zero nonce, never count.
pub fn latest_outgoing_nonce(transactions: &[Transaction], account: &Address) -> Option<(Address, u64)> {
    transactions
        .iter()
        .filter(|tx| tx.from.matches(account.as_str()))
        .filter_map(|tx| tx.nonce.filter(|n| *n > 0).map(|n| (tx.from.clone(), n)))
        .max_by_key(|(_, nonce)| *nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(from: &str, nonce: Option<u64>) -> Transaction {
        Transaction {
            hash: format!("0x{}", nonce.unwrap_or_default()),
            from: Address::new(from),
            to: None,
            nonce,
            network: Network::Mainnet,
            pending: false,
        }
    }

    #[test]
    fn test_network_chain_id_mapping() {
        for network in Network::ALL {
            assert_eq!(Network::from_chain_id(network.chain_id()), Some(network));
        }
        assert_eq!(Network::from_chain_id(1), Some(Network::Mainnet));
        assert_eq!(Network::from_chain_id(999), None);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("goerli".parse::<Network>().unwrap(), Network::Goerli);
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("polygon".parse::<Network>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&NativeCurrency::Usd).unwrap(), "\"USD\"");
        assert_eq!(serde_json::to_string(&Language::EnUs).unwrap(), "\"en_US\"");
        assert_eq!(serde_json::to_string(&Network::Kovan).unwrap(), "\"kovan\"");
    }

    #[test]
    fn test_address_key_is_lowercase() {
        let address = Address::new("0xABCdef");
        assert_eq!(address.key(), "0xabcdef");
        assert!(address.matches("0xabcDEF"));
        assert_eq!(address.to_string(), "0xABCdef");
    }

    #[test]
    fn test_session_liveness_is_strict() {
        let now = Utc::now();
        let session = Session {
            peer_id: "peer".to_string(),
            client_id: "client".to_string(),
            dapp_name: "Dapp".to_string(),
            dapp_url: "https://dapp.example".to_string(),
            dapp_icon: None,
            account_address: Address::new("0x1"),
            chain_id: 1,
            expires_at: now,
        };
        assert!(!session.is_live_at(now));
        assert!(session.is_live_at(now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_latest_outgoing_nonce_picks_highest_from_account() {
        let account = Address::new("0xAAA");
        let transactions = vec![
            tx("0xaaa", Some(3)),
            tx("0xbbb", Some(40)),
            tx("0xAAA", Some(7)),
            tx("0xaaa", None),
        ];

        let (from, nonce) = latest_outgoing_nonce(&transactions, &account).unwrap();
        assert_eq!(nonce, 7);
        assert_eq!(from, Address::new("0xAAA"));
    }

    #[test]
    fn test_latest_outgoing_nonce_ignores_zero_and_foreign() {
        let account = Address::new("0xaaa");
        let transactions = vec![tx("0xaaa", Some(0)), tx("0xbbb", Some(9))];
        assert_eq!(latest_outgoing_nonce(&transactions, &account), None);
        assert_eq!(latest_outgoing_nonce(&[], &account), None);
    }
}
