//! Actions understood by the wallet state containers
//!
//! On the wire an action is `{"type": "<concern>/<event>", "payload": ...}`;
//! unit actions carry no payload. Any tag outside [`Action::TAGS`]
//! deserializes to [`Action::Unrecognized`], whatever its payload.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::state::nonces::NonceTable;
use crate::types::{
    AccountAsset, Address, ImageMetadata, Language, NativeCurrency, Network,
    PendingSessionRequest, Session, Transaction, Wallet, WalletLoadingState,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "type", content = "payload")]
pub enum Action {
    // settings
    #[serde(rename = "settings/update_account_address")]
    UpdateAccountAddress(Address),
    #[serde(rename = "settings/native_currency_changed")]
    NativeCurrencyChanged(NativeCurrency),
    #[serde(rename = "settings/app_icon_changed")]
    AppIconChanged(String),
    #[serde(rename = "settings/language_changed")]
    LanguageChanged(Language),
    #[serde(rename = "settings/network_changed")]
    NetworkChanged { chain_id: u64 },
    #[serde(rename = "settings/testnets_pref_changed")]
    TestnetsPrefChanged(bool),
    #[serde(rename = "settings/account_settings_loaded")]
    AccountSettingsLoaded {
        native_currency: NativeCurrency,
        testnets_enabled: bool,
    },

    // wallets
    #[serde(rename = "wallets/loaded")]
    WalletsLoaded {
        selected: Option<Wallet>,
        wallet_names: BTreeMap<String, String>,
        wallets: BTreeMap<String, Wallet>,
    },
    #[serde(rename = "wallets/updated")]
    WalletsUpdated(BTreeMap<String, Wallet>),
    #[serde(rename = "wallets/names_updated")]
    WalletNamesUpdated(BTreeMap<String, String>),
    #[serde(rename = "wallets/loading_set")]
    WalletLoadingSet(Option<WalletLoadingState>),
    #[serde(rename = "wallets/selected")]
    WalletSelected(Wallet),

    // hidden coins
    #[serde(rename = "hidden_coins/loaded")]
    HiddenCoinsLoaded(Vec<String>),
    #[serde(rename = "hidden_coins/updated")]
    HiddenCoinsUpdated(Vec<String>),

    // keyboard
    #[serde(rename = "keyboard/shown")]
    KeyboardShown { height: f64 },
    #[serde(rename = "keyboard/hidden")]
    KeyboardHidden,
    #[serde(rename = "keyboard/height_restored")]
    KeyboardHeightRestored { height: f64 },

    // modal
    #[serde(rename = "modal/opened")]
    ModalOpened,
    #[serde(rename = "modal/closed")]
    ModalClosed,

    // swipe
    #[serde(rename = "swipe/velocity_updated")]
    SwipeVelocityUpdated(f64),

    // readiness
    #[serde(rename = "readiness/wallet_ready_changed")]
    WalletReadyChanged(bool),

    // image metadata
    #[serde(rename = "image_metadata/loaded")]
    ImageMetadataLoaded(BTreeMap<String, ImageMetadata>),
    #[serde(rename = "image_metadata/merged")]
    ImageMetadataMerged { id: String, metadata: ImageMetadata },
    #[serde(rename = "image_metadata/pruned")]
    ImageMetadataPruned(Vec<String>),

    // walletconnect
    #[serde(rename = "walletconnect/sessions_loaded")]
    SessionsLoaded(BTreeMap<String, Session>),
    #[serde(rename = "walletconnect/session_added")]
    SessionAdded(Session),
    #[serde(rename = "walletconnect/sessions_replaced")]
    SessionsReplaced(BTreeMap<String, Session>),
    #[serde(rename = "walletconnect/pending_request_added")]
    PendingRequestAdded(PendingSessionRequest),
    #[serde(rename = "walletconnect/pending_request_removed")]
    PendingRequestRemoved { peer_id: String },
    #[serde(rename = "walletconnect/pending_redirect_set")]
    PendingRedirectSet,
    #[serde(rename = "walletconnect/pending_redirect_removed")]
    PendingRedirectRemoved,
    #[serde(rename = "walletconnect/cleared")]
    WalletConnectCleared,

    // nonces
    #[serde(rename = "nonces/loaded")]
    NoncesLoaded(NonceTable),
    #[serde(rename = "nonces/incremented")]
    NonceIncremented {
        account: Address,
        network: Network,
        nonce: i64,
    },
    #[serde(rename = "nonces/decremented")]
    NonceDecremented {
        account: Address,
        network: Network,
        nonce: i64,
    },

    // initial fetch
    #[serde(rename = "initial_fetch/assets_fetched")]
    AssetsFetched,
    #[serde(rename = "initial_fetch/transactions_fetched")]
    TransactionsFetched,

    // data
    #[serde(rename = "data/assets_load_requested")]
    AssetsLoadRequested,
    #[serde(rename = "data/assets_load_succeeded")]
    AssetsLoadSucceeded(BTreeMap<String, AccountAsset>),
    #[serde(rename = "data/assets_load_failed")]
    AssetsLoadFailed,
    #[serde(rename = "data/transactions_load_requested")]
    TransactionsLoadRequested,
    #[serde(rename = "data/transactions_load_succeeded")]
    TransactionsLoadSucceeded(Vec<Transaction>),
    #[serde(rename = "data/transactions_load_failed")]
    TransactionsLoadFailed,
    #[serde(rename = "data/pending_transactions_updated")]
    PendingTransactionsUpdated(Vec<Transaction>),
    #[serde(rename = "data/cleared")]
    DataCleared,

    // explorer
    #[serde(rename = "explorer/started")]
    ExplorerStarted {
        polling_interval_ms: u64,
        address: Address,
        started_at: DateTime<Utc>,
    },
    #[serde(rename = "explorer/stopped")]
    ExplorerStopped,

    /// Any tag no container knows; every container ignores it
    #[serde(skip)]
    Unrecognized(String),
}

impl Action {
    /// Every wire tag with a dedicated variant
    pub const TAGS: &'static [&'static str] = &[
        "settings/update_account_address",
        "settings/native_currency_changed",
        "settings/app_icon_changed",
        "settings/language_changed",
        "settings/network_changed",
        "settings/testnets_pref_changed",
        "settings/account_settings_loaded",
        "wallets/loaded",
        "wallets/updated",
        "wallets/names_updated",
        "wallets/loading_set",
        "wallets/selected",
        "hidden_coins/loaded",
        "hidden_coins/updated",
        "keyboard/shown",
        "keyboard/hidden",
        "keyboard/height_restored",
        "modal/opened",
        "modal/closed",
        "swipe/velocity_updated",
        "readiness/wallet_ready_changed",
        "image_metadata/loaded",
        "image_metadata/merged",
        "image_metadata/pruned",
        "walletconnect/sessions_loaded",
        "walletconnect/session_added",
        "walletconnect/sessions_replaced",
        "walletconnect/pending_request_added",
        "walletconnect/pending_request_removed",
        "walletconnect/pending_redirect_set",
        "walletconnect/pending_redirect_removed",
        "walletconnect/cleared",
        "nonces/loaded",
        "nonces/incremented",
        "nonces/decremented",
        "initial_fetch/assets_fetched",
        "initial_fetch/transactions_fetched",
        "data/assets_load_requested",
        "data/assets_load_succeeded",
        "data/assets_load_failed",
        "data/transactions_load_requested",
        "data/transactions_load_succeeded",
        "data/transactions_load_failed",
        "data/pending_transactions_updated",
        "data/cleared",
        "explorer/started",
        "explorer/stopped",
    ];

    /// The wire tag of this action
    pub fn tag(&self) -> &str {
        match self {
            Action::UpdateAccountAddress(_) => "settings/update_account_address",
            Action::NativeCurrencyChanged(_) => "settings/native_currency_changed",
            Action::AppIconChanged(_) => "settings/app_icon_changed",
            Action::LanguageChanged(_) => "settings/language_changed",
            Action::NetworkChanged { .. } => "settings/network_changed",
            Action::TestnetsPrefChanged(_) => "settings/testnets_pref_changed",
            Action::AccountSettingsLoaded { .. } => "settings/account_settings_loaded",
            Action::WalletsLoaded { .. } => "wallets/loaded",
            Action::WalletsUpdated(_) => "wallets/updated",
            Action::WalletNamesUpdated(_) => "wallets/names_updated",
            Action::WalletLoadingSet(_) => "wallets/loading_set",
            Action::WalletSelected(_) => "wallets/selected",
            Action::HiddenCoinsLoaded(_) => "hidden_coins/loaded",
            Action::HiddenCoinsUpdated(_) => "hidden_coins/updated",
            Action::KeyboardShown { .. } => "keyboard/shown",
            Action::KeyboardHidden => "keyboard/hidden",
            Action::KeyboardHeightRestored { .. } => "keyboard/height_restored",
            Action::ModalOpened => "modal/opened",
            Action::ModalClosed => "modal/closed",
            Action::SwipeVelocityUpdated(_) => "swipe/velocity_updated",
            Action::WalletReadyChanged(_) => "readiness/wallet_ready_changed",
            Action::ImageMetadataLoaded(_) => "image_metadata/loaded",
            Action::ImageMetadataMerged { .. } => "image_metadata/merged",
            Action::ImageMetadataPruned(_) => "image_metadata/pruned",
            Action::SessionsLoaded(_) => "walletconnect/sessions_loaded",
            Action::SessionAdded(_) => "walletconnect/session_added",
            Action::SessionsReplaced(_) => "walletconnect/sessions_replaced",
            Action::PendingRequestAdded(_) => "walletconnect/pending_request_added",
            Action::PendingRequestRemoved { .. } => "walletconnect/pending_request_removed",
            Action::PendingRedirectSet => "walletconnect/pending_redirect_set",
            Action::PendingRedirectRemoved => "walletconnect/pending_redirect_removed",
            Action::WalletConnectCleared => "walletconnect/cleared",
            Action::NoncesLoaded(_) => "nonces/loaded",
            Action::NonceIncremented { .. } => "nonces/incremented",
            Action::NonceDecremented { .. } => "nonces/decremented",
            Action::AssetsFetched => "initial_fetch/assets_fetched",
            Action::TransactionsFetched => "initial_fetch/transactions_fetched",
            Action::AssetsLoadRequested => "data/assets_load_requested",
            Action::AssetsLoadSucceeded(_) => "data/assets_load_succeeded",
            Action::AssetsLoadFailed => "data/assets_load_failed",
            Action::TransactionsLoadRequested => "data/transactions_load_requested",
            Action::TransactionsLoadSucceeded(_) => "data/transactions_load_succeeded",
            Action::TransactionsLoadFailed => "data/transactions_load_failed",
            Action::PendingTransactionsUpdated(_) => "data/pending_transactions_updated",
            Action::DataCleared => "data/cleared",
            Action::ExplorerStarted { .. } => "explorer/started",
            Action::ExplorerStopped => "explorer/stopped",
            Action::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Action::Unrecognized(_))
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Action::Unrecognized(tag) => {
                use serde::ser::SerializeStruct;
                let mut state = serializer.serialize_struct("Action", 1)?;
                state.serialize_field("type", tag)?;
                state.end()
            }
            known => Action::serialize(known, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?;

        if !Action::TAGS.contains(&tag) {
            return Ok(Action::Unrecognized(tag.to_string()));
        }
        Action::deserialize(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimensions;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Action {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unit_action_has_no_payload() {
        let json = serde_json::to_value(&Action::ModalOpened).unwrap();
        assert_eq!(json, json!({"type": "modal/opened"}));
        assert_eq!(parse(json), Action::ModalOpened);
    }

    #[test]
    fn test_struct_payload_wire_shape() {
        let action = parse(json!({
            "type": "image_metadata/merged",
            "payload": {"id": "x", "metadata": {"dimensions": {"width": 10, "height": 20}}}
        }));
        assert_eq!(
            action,
            Action::ImageMetadataMerged {
                id: "x".to_string(),
                metadata: ImageMetadata {
                    dimensions: Dimensions { width: 10, height: 20 },
                    color: None,
                },
            }
        );
    }

    #[test]
    fn test_newtype_payload_wire_shape() {
        let json = serde_json::to_value(&Action::SwipeVelocityUpdated(1.5)).unwrap();
        assert_eq!(json, json!({"type": "swipe/velocity_updated", "payload": 1.5}));
    }

    #[test]
    fn test_unknown_tag_becomes_unrecognized() {
        let action = parse(json!({"type": "gas/prices_updated", "payload": {"fast": 12}}));
        assert_eq!(action, Action::Unrecognized("gas/prices_updated".to_string()));
        assert!(!action.is_recognized());
        assert_eq!(action.tag(), "gas/prices_updated");
    }

    #[test]
    fn test_known_tag_with_bad_payload_is_an_error() {
        let result: Result<Action, _> =
            serde_json::from_value(json!({"type": "keyboard/shown", "payload": "tall"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let result: Result<Action, _> = serde_json::from_value(json!({"payload": 1}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("type"));
    }

    #[test]
    fn test_unrecognized_serializes_tag_only() {
        let json = serde_json::to_value(&Action::Unrecognized("foo/bar".to_string())).unwrap();
        assert_eq!(json, json!({"type": "foo/bar"}));
    }

    /// Position of the variant in `Action::TAGS`
    ///
    /// No wildcard arm: a new variant does not compile until it is listed
    /// here, and `one_of_each` must then grow a matching instance.
    fn position(action: &Action) -> Option<usize> {
        let index = match action {
            Action::UpdateAccountAddress(_) => 0,
            Action::NativeCurrencyChanged(_) => 1,
            Action::AppIconChanged(_) => 2,
            Action::LanguageChanged(_) => 3,
            Action::NetworkChanged { .. } => 4,
            Action::TestnetsPrefChanged(_) => 5,
            Action::AccountSettingsLoaded { .. } => 6,
            Action::WalletsLoaded { .. } => 7,
            Action::WalletsUpdated(_) => 8,
            Action::WalletNamesUpdated(_) => 9,
            Action::WalletLoadingSet(_) => 10,
            Action::WalletSelected(_) => 11,
            Action::HiddenCoinsLoaded(_) => 12,
            Action::HiddenCoinsUpdated(_) => 13,
            Action::KeyboardShown { .. } => 14,
            Action::KeyboardHidden => 15,
            Action::KeyboardHeightRestored { .. } => 16,
            Action::ModalOpened => 17,
            Action::ModalClosed => 18,
            Action::SwipeVelocityUpdated(_) => 19,
            Action::WalletReadyChanged(_) => 20,
            Action::ImageMetadataLoaded(_) => 21,
            Action::ImageMetadataMerged { .. } => 22,
            Action::ImageMetadataPruned(_) => 23,
            Action::SessionsLoaded(_) => 24,
            Action::SessionAdded(_) => 25,
            Action::SessionsReplaced(_) => 26,
            Action::PendingRequestAdded(_) => 27,
            Action::PendingRequestRemoved { .. } => 28,
            Action::PendingRedirectSet => 29,
            Action::PendingRedirectRemoved => 30,
            Action::WalletConnectCleared => 31,
            Action::NoncesLoaded(_) => 32,
            Action::NonceIncremented { .. } => 33,
            Action::NonceDecremented { .. } => 34,
            Action::AssetsFetched => 35,
            Action::TransactionsFetched => 36,
            Action::AssetsLoadRequested => 37,
            Action::AssetsLoadSucceeded(_) => 38,
            Action::AssetsLoadFailed => 39,
            Action::TransactionsLoadRequested => 40,
            Action::TransactionsLoadSucceeded(_) => 41,
            Action::TransactionsLoadFailed => 42,
            Action::PendingTransactionsUpdated(_) => 43,
            Action::DataCleared => 44,
            Action::ExplorerStarted { .. } => 45,
            Action::ExplorerStopped => 46,
            Action::Unrecognized(_) => return None,
        };
        Some(index)
    }

    fn one_of_each() -> Vec<Action> {
        let address = Address::new("0xabc");
        let at = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 5, 1, 9, 0, 0).unwrap();
        let wallet = Wallet {
            id: "w1".to_string(),
            name: "Main".to_string(),
            addresses: Vec::new(),
            color: 0,
            imported: false,
            primary: true,
            backed_up: false,
        };
        let session = Session {
            peer_id: "peer".to_string(),
            client_id: "client".to_string(),
            dapp_name: "Dapp".to_string(),
            dapp_url: "https://dapp.example".to_string(),
            dapp_icon: None,
            account_address: address.clone(),
            chain_id: 1,
            expires_at: at,
        };
        let metadata = ImageMetadata {
            dimensions: Dimensions { width: 1, height: 1 },
            color: None,
        };
        let transaction = Transaction {
            hash: "0x01".to_string(),
            from: address.clone(),
            to: None,
            nonce: Some(1),
            network: Network::Mainnet,
            pending: true,
        };

        vec![
            Action::UpdateAccountAddress(address.clone()),
            Action::NativeCurrencyChanged(NativeCurrency::Eur),
            Action::AppIconChanged("pixel".to_string()),
            Action::LanguageChanged(Language::Ja),
            Action::NetworkChanged { chain_id: 5 },
            Action::TestnetsPrefChanged(true),
            Action::AccountSettingsLoaded {
                native_currency: NativeCurrency::Gbp,
                testnets_enabled: false,
            },
            Action::WalletsLoaded {
                selected: Some(wallet.clone()),
                wallet_names: BTreeMap::from([("0xabc".to_string(), "alice.eth".to_string())]),
                wallets: BTreeMap::from([("w1".to_string(), wallet.clone())]),
            },
            Action::WalletsUpdated(BTreeMap::from([("w1".to_string(), wallet.clone())])),
            Action::WalletNamesUpdated(BTreeMap::new()),
            Action::WalletLoadingSet(Some(WalletLoadingState::BackingUp)),
            Action::WalletSelected(wallet),
            Action::HiddenCoinsLoaded(vec!["dai".to_string()]),
            Action::HiddenCoinsUpdated(Vec::new()),
            Action::KeyboardShown { height: 300.0 },
            Action::KeyboardHidden,
            Action::KeyboardHeightRestored { height: 280.0 },
            Action::ModalOpened,
            Action::ModalClosed,
            Action::SwipeVelocityUpdated(0.5),
            Action::WalletReadyChanged(true),
            Action::ImageMetadataLoaded(BTreeMap::from([("logo".to_string(), metadata.clone())])),
            Action::ImageMetadataMerged {
                id: "logo".to_string(),
                metadata,
            },
            Action::ImageMetadataPruned(vec!["logo".to_string()]),
            Action::SessionsLoaded(BTreeMap::from([("peer".to_string(), session.clone())])),
            Action::SessionAdded(session.clone()),
            Action::SessionsReplaced(BTreeMap::from([("peer".to_string(), session)])),
            Action::PendingRequestAdded(PendingSessionRequest {
                peer_id: "peer".to_string(),
                dapp_name: "Dapp".to_string(),
                dapp_url: "https://dapp.example".to_string(),
                dapp_icon: None,
                received_at: at,
            }),
            Action::PendingRequestRemoved {
                peer_id: "peer".to_string(),
            },
            Action::PendingRedirectSet,
            Action::PendingRedirectRemoved,
            Action::WalletConnectCleared,
            Action::NoncesLoaded(NonceTable::new()),
            Action::NonceIncremented {
                account: address.clone(),
                network: Network::Mainnet,
                nonce: 4,
            },
            Action::NonceDecremented {
                account: address.clone(),
                network: Network::Goerli,
                nonce: 2,
            },
            Action::AssetsFetched,
            Action::TransactionsFetched,
            Action::AssetsLoadRequested,
            Action::AssetsLoadSucceeded(BTreeMap::from([(
                "eth".to_string(),
                AccountAsset {
                    unique_id: "eth".to_string(),
                    symbol: "ETH".to_string(),
                    name: "Ether".to_string(),
                    balance: "1".to_string(),
                },
            )])),
            Action::AssetsLoadFailed,
            Action::TransactionsLoadRequested,
            Action::TransactionsLoadSucceeded(vec![transaction.clone()]),
            Action::TransactionsLoadFailed,
            Action::PendingTransactionsUpdated(vec![transaction]),
            Action::DataCleared,
            Action::ExplorerStarted {
                polling_interval_ms: 15_000,
                address,
                started_at: at,
            },
            Action::ExplorerStopped,
        ]
    }

    #[test]
    fn test_every_variant_has_its_tag_and_wire_type() {
        let actions = one_of_each();
        assert_eq!(actions.len(), Action::TAGS.len());

        let mut covered = vec![false; Action::TAGS.len()];
        for action in &actions {
            let index = position(action).unwrap();
            assert_eq!(Action::TAGS[index], action.tag());
            assert!(!covered[index], "{} listed twice", action.tag());
            covered[index] = true;

            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json["type"], action.tag());
            let back: Action = serde_json::from_value(json).unwrap();
            assert!(back.is_recognized(), "{} read back as unrecognized", action.tag());
            assert_eq!(&back, action);
        }
        assert!(covered.iter().all(|c| *c));
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags = Action::TAGS.to_vec();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), Action::TAGS.len());
    }
}
