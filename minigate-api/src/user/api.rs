//! User and wallet endpoints.
//!
//! GET endpoints send their request struct as query parameters; POST
//! endpoints send it as the JSON body. Callers pass [`RequestOptions`] to
//! control deduplication and error reporting; method, params and body are
//! set here.

use std::sync::Arc;

use minigate_fetch::{Dispatcher, Method, Params, RequestError, RequestOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::request::{
    GenerateWalletRequest, TelegramLoginRequest, UpdateWalletRequest, WalletAddressRequest,
    WalletListRequest, WithdrawHistoryRequest, WithdrawRequest,
};
use super::response::{GeneratedWallet, LoginResponse, WalletItem, WalletList, WithdrawHistory};

// ============================================================================
// Endpoints
// ============================================================================

/// Endpoint paths, relative to the API base URL.
pub mod endpoints {
    /// Telegram login.
    pub const TELEGRAM_LOGIN: &str = "/public/user/auth/telegram-login";
    /// Wallet list.
    pub const WALLET_LIST: &str = "/private/user/wallet/list";
    /// Withdraw.
    pub const WALLET_WITHDRAW: &str = "/private/user/wallet/withdraw";
    /// Withdraw history.
    pub const WALLET_WITHDRAW_HISTORY: &str = "/private/user/wallet/withdraw-history";
    /// Generate wallet.
    pub const WALLET_GENERATE: &str = "/private/user/wallet/generate";
    /// Set primary wallet.
    pub const WALLET_SET_PRIMARY: &str = "/private/user/wallet/set-primary";
    /// Wallet detail.
    pub const WALLET_DETAIL: &str = "/private/user/wallet/detail";
    /// Update wallet.
    pub const WALLET_UPDATE: &str = "/private/user/wallet/update";
}

// ============================================================================
// Client
// ============================================================================

/// Typed client for the user endpoints.
#[derive(Debug, Clone)]
pub struct UserApi {
    dispatcher: Arc<Dispatcher>,
}

impl UserApi {
    /// Creates a client on top of `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Returns the underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn get<Q, T>(
        &self,
        path: &str,
        query: &Q,
        options: RequestOptions,
    ) -> Result<Option<T>, RequestError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = Params::from_serializable(query)?;
        let options = options.method(Method::GET).params(params);
        self.dispatcher.request(path, options).await
    }

    async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<Option<T>, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = options.method(Method::POST).json(body)?;
        self.dispatcher.request(path, options).await
    }

    /// Exchanges the platform init data for a session token.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip_all)]
    pub async fn auth_telegram_login(
        &self,
        request: &TelegramLoginRequest,
        options: RequestOptions,
    ) -> Result<Option<LoginResponse>, RequestError> {
        debug!("Logging in with init data");
        self.post(endpoints::TELEGRAM_LOGIN, request, options).await
    }

    /// Lists the user's wallets.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_list(
        &self,
        request: &WalletListRequest,
        options: RequestOptions,
    ) -> Result<Option<WalletList>, RequestError> {
        self.get(endpoints::WALLET_LIST, request, options).await
    }

    /// Withdraws tokens to an external address.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidInput`] if the request is incomplete,
    /// otherwise the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_withdraw(
        &self,
        request: &WithdrawRequest,
        options: RequestOptions,
    ) -> Result<Option<bool>, RequestError> {
        request.validate()?;
        self.post(endpoints::WALLET_WITHDRAW, request, options).await
    }

    /// Returns one page of withdrawals for a wallet.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_withdraw_history(
        &self,
        request: &WithdrawHistoryRequest,
        options: RequestOptions,
    ) -> Result<Option<WithdrawHistory>, RequestError> {
        self.get(endpoints::WALLET_WITHDRAW_HISTORY, request, options)
            .await
    }

    /// Generates a new wallet.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_generate(
        &self,
        request: &GenerateWalletRequest,
        options: RequestOptions,
    ) -> Result<Option<GeneratedWallet>, RequestError> {
        self.post(endpoints::WALLET_GENERATE, request, options).await
    }

    /// Makes a wallet the primary one. Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_set_primary(
        &self,
        request: &WalletAddressRequest,
        options: RequestOptions,
    ) -> Result<Option<WalletList>, RequestError> {
        self.post(endpoints::WALLET_SET_PRIMARY, request, options)
            .await
    }

    /// Returns one wallet with its token holdings.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_detail(
        &self,
        request: &WalletAddressRequest,
        options: RequestOptions,
    ) -> Result<Option<WalletItem>, RequestError> {
        self.get(endpoints::WALLET_DETAIL, request, options).await
    }

    /// Renames a wallet. Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self, options))]
    pub async fn wallet_update(
        &self,
        request: &UpdateWalletRequest,
        options: RequestOptions,
    ) -> Result<Option<WalletList>, RequestError> {
        self.post(endpoints::WALLET_UPDATE, request, options).await
    }
}
