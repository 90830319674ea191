//! Request bodies and query parameters for the user endpoints.

use minigate_core::PaginationRequest;
use minigate_fetch::RequestError;
use serde::{Deserialize, Serialize};

/// Chain every wallet endpoint currently serves.
pub const DEFAULT_CHAIN: &str = "solana";

/// Body of `POST /public/user/auth/telegram-login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramLoginRequest {
    /// Signed init data from the launch parameters.
    pub init_data_raw: String,
}

/// Query of `GET /private/user/wallet/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletListRequest {
    /// Chain name.
    pub chain: String,
}

impl Default for WalletListRequest {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
        }
    }
}

/// Body of `POST /private/user/wallet/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateWalletRequest {
    /// Chain name.
    pub chain: String,
}

impl Default for GenerateWalletRequest {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
        }
    }
}

/// Identifies one wallet. Used by `set-primary` and `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAddressRequest {
    /// Wallet address.
    pub address: String,
    /// Chain name.
    pub chain: String,
}

impl WalletAddressRequest {
    /// Creates a request for `address` on the default chain.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chain: DEFAULT_CHAIN.to_string(),
        }
    }
}

/// Body of `POST /private/user/wallet/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWalletRequest {
    /// Chain name.
    pub chain: String,
    /// Wallet address.
    pub address: String,
    /// New display name.
    pub name: String,
}

/// Query of `GET /private/user/wallet/withdraw-history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawHistoryRequest {
    /// Wallet address.
    pub address: String,
    /// Chain name.
    pub chain: String,
    /// Paging.
    #[serde(flatten)]
    pub pagination: PaginationRequest,
}

/// Body of `POST /private/user/wallet/withdraw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// Chain name.
    pub chain: String,
    /// Source wallet address.
    pub from_address: String,
    /// Destination address.
    pub to_address: String,
    /// Token mint address, or `native` for the chain currency.
    pub token_address: String,
    /// Decimal amount as a string.
    pub amount: String,
}

impl WithdrawRequest {
    /// Checks that every field is present and the amount is positive.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidInput`] naming the missing fields, or
    /// describing the bad amount.
    pub fn validate(&self) -> Result<(), RequestError> {
        let missing: Vec<&str> = [
            ("chain", &self.chain),
            ("fromAddress", &self.from_address),
            ("toAddress", &self.to_address),
            ("tokenAddress", &self.token_address),
            ("amount", &self.amount),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(RequestError::InvalidInput(format!(
                "missing withdraw fields: {}",
                missing.join(", ")
            )));
        }

        match self.amount.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(()),
            _ => Err(RequestError::InvalidInput(format!(
                "withdraw amount must be greater than zero: {}",
                self.amount
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn withdraw() -> WithdrawRequest {
        WithdrawRequest {
            chain: DEFAULT_CHAIN.to_string(),
            from_address: "From111".to_string(),
            to_address: "To222".to_string(),
            token_address: "native".to_string(),
            amount: "0.5".to_string(),
        }
    }

    #[test]
    fn test_withdraw_wire_names() {
        let value = serde_json::to_value(withdraw()).unwrap();
        assert_eq!(value["fromAddress"], "From111");
        assert_eq!(value["tokenAddress"], "native");
    }

    #[test]
    fn test_withdraw_validation() {
        assert!(withdraw().validate().is_ok());

        let mut missing = withdraw();
        missing.to_address = String::new();
        missing.chain = " ".to_string();
        let err = missing.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request input: missing withdraw fields: chain, toAddress"
        );

        for amount in ["0", "-1", "abc", "NaN"] {
            let mut bad = withdraw();
            bad.amount = amount.to_string();
            assert!(bad.validate().is_err(), "{amount} should be rejected");
        }
    }

    #[test]
    fn test_history_pagination_is_flattened() {
        let request = WithdrawHistoryRequest {
            address: "A".to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            pagination: PaginationRequest {
                page_index: Some(2),
                page_size: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"address": "A", "chain": "solana", "pageIndex": 2})
        );
    }
}
