//! Response payloads of the user endpoints.
//!
//! The server may omit any field, so every field is optional. Balance and
//! amount fields are decimal strings and are kept as such.

use std::fmt;

use minigate_core::PaginationResponse;
use serde::{Deserialize, Serialize};

/// Payload of the Telegram login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    /// Session token for the `auth-token` header.
    pub token: Option<String>,
}

/// One token held by a wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenItem {
    /// Token name.
    pub name: Option<String>,
    /// Mint address.
    pub address: Option<String>,
    /// Icon URL.
    pub image_url: Option<String>,
    /// Holding value in SOL.
    #[serde(rename = "balanceInSOL")]
    pub balance_in_sol: Option<String>,
    /// Holding value in USDC.
    #[serde(rename = "balanceInUSDC")]
    pub balance_in_usdc: Option<String>,
    /// Unit price in USDC.
    #[serde(rename = "priceInUSDC")]
    pub price_in_usdc: Option<String>,
    /// Token amount.
    pub amount: Option<String>,
}

/// A custodial wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletItem {
    /// Wallet address.
    pub address: Option<String>,
    /// True for the user's primary wallet.
    pub primary: Option<bool>,
    /// Display name.
    pub name: Option<String>,
    /// Total value in SOL.
    #[serde(rename = "totalBalanceInSOL")]
    pub total_balance_in_sol: Option<String>,
    /// Total value in USDC.
    #[serde(rename = "totalBalanceInUSDC")]
    pub total_balance_in_usdc: Option<String>,
    /// Value of non-native tokens in SOL.
    #[serde(rename = "tokenBalanceInSOL")]
    pub token_balance_in_sol: Option<String>,
    /// Value of non-native tokens in USDC.
    #[serde(rename = "tokenBalanceInUSDC")]
    pub token_balance_in_usdc: Option<String>,
    /// Token holdings.
    pub tokens: Option<Vec<TokenItem>>,
}

impl WalletItem {
    /// Returns the token holdings, empty if the server omitted them.
    pub fn tokens(&self) -> &[TokenItem] {
        self.tokens.as_deref().unwrap_or_default()
    }
}

/// Payload of the wallet list, set-primary and update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletList {
    /// Total value of all wallets in SOL.
    #[serde(rename = "totalBalanceInSOL")]
    pub total_balance_in_sol: Option<String>,
    /// Total value of all wallets in USDC.
    #[serde(rename = "totalBalanceInUSDC")]
    pub total_balance_in_usdc: Option<String>,
    /// Wallets.
    pub wallets: Option<Vec<WalletItem>>,
}

impl WalletList {
    /// Returns the wallets, empty if the server omitted them.
    pub fn wallets(&self) -> &[WalletItem] {
        self.wallets.as_deref().unwrap_or_default()
    }

    /// Returns the primary wallet.
    pub fn primary(&self) -> Option<&WalletItem> {
        self.wallets().iter().find(|w| w.primary == Some(true))
    }
}

/// One withdrawal record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WithdrawHistoryItem {
    /// Source address.
    pub from_address: Option<String>,
    /// Destination address.
    pub to_address: Option<String>,
    /// Token mint address.
    pub token_address: Option<String>,
    /// Amount withdrawn.
    pub amount: Option<String>,
    /// Request time.
    pub request_time: Option<String>,
    /// Confirmation time.
    pub confirm_time: Option<String>,
    /// Block the transfer was confirmed in.
    pub confirmed_block: Option<u64>,
    /// Processing status.
    pub status: Option<String>,
    /// Chain name.
    pub chain: Option<String>,
    /// Network fee.
    pub fee: Option<String>,
    /// Token icon URL.
    pub token_image_url: Option<String>,
    /// Token name.
    pub token_name: Option<String>,
}

/// Payload of the withdraw history endpoint.
pub type WithdrawHistory = PaginationResponse<WithdrawHistoryItem>;

/// Key pair returned by the wallet generator.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratedWallet {
    /// Public key (wallet address).
    pub pubkey: Option<String>,
    /// Private key. Shown to the user once.
    pub private_key: Option<String>,
}

impl fmt::Debug for GeneratedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedWallet")
            .field("pubkey", &self.pubkey)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
