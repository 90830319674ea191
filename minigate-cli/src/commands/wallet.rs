//! Wallet command - custodial wallet operations.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use minigate_api::UserApi;
use minigate_api::user::{
    DEFAULT_CHAIN, GenerateWalletRequest, UpdateWalletRequest, WalletAddressRequest,
    WalletListRequest, WithdrawHistoryRequest, WithdrawRequest, endpoints,
};
use minigate_core::PaginationRequest;
use minigate_fetch::RequestOptions;
use tracing::info;

use crate::Cli;
use crate::commands::print_response;
use crate::context::Context;

/// Arguments for the wallet command.
#[derive(Args, Debug)]
pub struct WalletArgs {
    #[command(subcommand)]
    pub action: WalletAction,

    /// Chain the wallets live on.
    #[arg(long, default_value = DEFAULT_CHAIN, global = true)]
    pub chain: String,
}

/// Wallet subcommands.
#[derive(Subcommand, Debug)]
pub enum WalletAction {
    /// List wallets with balances.
    List,

    /// Show one wallet with its tokens.
    Detail {
        /// Wallet address.
        address: String,
    },

    /// Show withdrawals from a wallet.
    History {
        /// Wallet address.
        address: String,

        /// Page index, starting at 1.
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page.
        #[arg(long, default_value = "999")]
        page_size: u32,
    },

    /// Generate a new wallet.
    Generate,

    /// Make a wallet the primary one.
    SetPrimary {
        /// Wallet address.
        address: String,
    },

    /// Rename a wallet.
    Update {
        /// Wallet address.
        address: String,

        /// New display name.
        #[arg(long)]
        name: String,
    },

    /// Withdraw tokens to an external address.
    Withdraw {
        /// Source wallet address.
        #[arg(long)]
        from: String,

        /// Destination address.
        #[arg(long)]
        to: String,

        /// Token mint address.
        #[arg(long)]
        token: String,

        /// Decimal amount.
        #[arg(long)]
        amount: String,
    },
}

/// Runs the wallet command.
pub async fn run(args: &WalletArgs, cli: &Cli) -> Result<()> {
    let mut ctx = Context::load(cli).await?;
    let api = UserApi::new(Arc::clone(&ctx.dispatcher));

    let result = dispatch(&api, args, cli).await;
    ctx.notify_session(cli.quiet);
    result
}

async fn dispatch(api: &UserApi, args: &WalletArgs, cli: &Cli) -> Result<()> {
    let chain = args.chain.clone();
    let options = RequestOptions::default();

    match &args.action {
        WalletAction::List => {
            let list = api.wallet_list(&WalletListRequest { chain }, options).await?;
            print_response(cli, endpoints::WALLET_LIST, list, |f, list| {
                f.format_wallet_list(list)
            })
        }
        WalletAction::Detail { address } => {
            let request = WalletAddressRequest {
                address: address.clone(),
                chain,
            };
            let wallet = api.wallet_detail(&request, options).await?;
            print_response(cli, endpoints::WALLET_DETAIL, wallet, |f, wallet| {
                f.format_wallet(wallet)
            })
        }
        WalletAction::History {
            address,
            page,
            page_size,
        } => {
            let request = WithdrawHistoryRequest {
                address: address.clone(),
                chain,
                pagination: PaginationRequest {
                    page_index: Some(*page),
                    page_size: Some(*page_size),
                },
            };
            let history = api.wallet_withdraw_history(&request, options).await?;
            print_response(cli, endpoints::WALLET_WITHDRAW_HISTORY, history, |f, history| {
                f.format_history(history)
            })
        }
        WalletAction::Generate => {
            let generated = api
                .wallet_generate(&GenerateWalletRequest { chain }, options)
                .await?;
            info!("Wallet generated");
            print_response(cli, endpoints::WALLET_GENERATE, generated, |f, wallet| {
                f.format_generated(wallet)
            })
        }
        WalletAction::SetPrimary { address } => {
            let request = WalletAddressRequest {
                address: address.clone(),
                chain,
            };
            let list = api.wallet_set_primary(&request, options).await?;
            print_response(cli, endpoints::WALLET_SET_PRIMARY, list, |f, list| {
                f.format_wallet_list(list)
            })
        }
        WalletAction::Update { address, name } => {
            let request = UpdateWalletRequest {
                chain,
                address: address.clone(),
                name: name.clone(),
            };
            let list = api.wallet_update(&request, options).await?;
            print_response(cli, endpoints::WALLET_UPDATE, list, |f, list| {
                f.format_wallet_list(list)
            })
        }
        WalletAction::Withdraw {
            from,
            to,
            token,
            amount,
        } => {
            let request = WithdrawRequest {
                chain,
                from_address: from.clone(),
                to_address: to.clone(),
                token_address: token.clone(),
                amount: amount.clone(),
            };
            let accepted = api.wallet_withdraw(&request, options).await?;
            info!(accepted = ?accepted, "Withdrawal submitted");
            print_response(cli, endpoints::WALLET_WITHDRAW, accepted, |_, accepted| {
                if *accepted {
                    "Withdrawal submitted".to_string()
                } else {
                    "Withdrawal rejected".to_string()
                }
            })
        }
    }
}
