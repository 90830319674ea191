//! User account and custodial wallet endpoints.
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | login | POST | `/public/user/auth/telegram-login` |
//! | wallet list | GET | `/private/user/wallet/list` |
//! | withdraw | POST | `/private/user/wallet/withdraw` |
//! | withdraw history | GET | `/private/user/wallet/withdraw-history` |
//! | generate | POST | `/private/user/wallet/generate` |
//! | set primary | POST | `/private/user/wallet/set-primary` |
//! | detail | GET | `/private/user/wallet/detail` |
//! | update | POST | `/private/user/wallet/update` |
//!
//! `/private` endpoints need the `auth-token` header; a rejected token
//! invalidates the session.

// Modules
mod api;
mod request;
mod response;

// Re-exports
pub use api::{UserApi, endpoints};
pub use request::{
    DEFAULT_CHAIN, GenerateWalletRequest, TelegramLoginRequest, UpdateWalletRequest,
    WalletAddressRequest, WalletListRequest, WithdrawHistoryRequest, WithdrawRequest,
};
pub use response::{
    GeneratedWallet, LoginResponse, TokenItem, WalletItem, WalletList, WithdrawHistory,
    WithdrawHistoryItem,
};
