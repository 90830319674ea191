//! Text output formatting with colors.

use std::collections::BTreeMap;

use minigate_api::user::{GeneratedWallet, WalletItem, WalletList, WithdrawHistory};
use minigate_store::Settings;
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

const RULE_WIDTH: usize = 40;
const PLACEHOLDER: &str = "-";

/// Text formatter with optional colors.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a wallet list with its totals.
    pub fn format_wallet_list(&self, list: &WalletList) -> String {
        let mut lines = vec![self.bold("Wallets"), "─".repeat(RULE_WIDTH)];

        if list.wallets().is_empty() {
            lines.push(self.dim("No wallets"));
        }
        for wallet in list.wallets() {
            let marker = if wallet.primary == Some(true) {
                self.green("*")
            } else {
                " ".to_string()
            };
            lines.push(format!(
                "{marker} {:<20} {}  {} SOL",
                field(wallet.name.as_ref()),
                field(wallet.address.as_ref()),
                field(wallet.total_balance_in_sol.as_ref()),
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {} SOL / {} USDC",
            field(list.total_balance_in_sol.as_ref()),
            field(list.total_balance_in_usdc.as_ref()),
        ));
        lines.join("\n")
    }

    /// Formats one wallet with its token holdings.
    pub fn format_wallet(&self, wallet: &WalletItem) -> String {
        let title = match (&wallet.name, wallet.primary) {
            (Some(name), Some(true)) => format!("{name} (primary)"),
            (Some(name), _) => name.clone(),
            (None, _) => "Wallet".to_string(),
        };

        let mut lines = vec![
            self.bold(&title),
            "─".repeat(RULE_WIDTH),
            format!("Address: {}", field(wallet.address.as_ref())),
            format!(
                "Balance: {} SOL / {} USDC",
                field(wallet.total_balance_in_sol.as_ref()),
                field(wallet.total_balance_in_usdc.as_ref()),
            ),
        ];

        if !wallet.tokens().is_empty() {
            lines.push(String::new());
            for token in wallet.tokens() {
                lines.push(format!(
                    "  {:<12} {:>16}  {}",
                    field(token.name.as_ref()),
                    field(token.amount.as_ref()),
                    self.dim(&format!("{} USDC", field(token.balance_in_usdc.as_ref()))),
                ));
            }
        }
        lines.join("\n")
    }

    /// Formats one page of withdrawals.
    pub fn format_history(&self, history: &WithdrawHistory) -> String {
        let mut lines = vec![self.bold("Withdrawals"), "─".repeat(RULE_WIDTH)];

        if history.rows().is_empty() {
            lines.push(self.dim("No withdrawals"));
        }
        for item in history.rows() {
            let status = item.status.as_deref().unwrap_or(PLACEHOLDER);
            lines.push(format!(
                "{:<20} {:>14} {:<8} -> {}  {}",
                field(item.request_time.as_ref()),
                field(item.amount.as_ref()),
                field(item.token_name.as_ref()),
                field(item.to_address.as_ref()),
                self.status(status),
            ));
        }

        if let Some(total) = history.total {
            lines.push(String::new());
            lines.push(self.dim(&format!("{} of {total}", history.rows().len())));
        }
        lines.join("\n")
    }

    /// Formats a freshly generated wallet, private key included.
    pub fn format_generated(&self, wallet: &GeneratedWallet) -> String {
        [
            self.bold("Wallet generated"),
            "─".repeat(RULE_WIDTH),
            format!("Public key:  {}", field(wallet.pubkey.as_ref())),
            format!("Private key: {}", field(wallet.private_key.as_ref())),
            String::new(),
            self.yellow("Store the private key now; it is not shown again."),
        ]
        .join("\n")
    }

    /// Formats request headers, one per line.
    pub fn format_headers(&self, headers: &BTreeMap<String, String>) -> String {
        let width = headers.keys().map(String::len).max().unwrap_or(0);
        headers
            .iter()
            .map(|(name, value)| format!("{}  {value}", self.bold(&format!("{name:<width$}"))))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats an arbitrary payload as indented JSON.
    pub fn format_value(&self, value: &Value) -> String {
        if value.is_null() {
            return self.dim("(no data)");
        }
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    /// Formats the effective settings.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let hosts = if settings.allowed_hosts.is_empty() {
            "any".to_string()
        } else {
            settings.allowed_hosts.join(", ")
        };
        let mock = if settings.mock_launch_params.is_some() {
            "set"
        } else {
            "unset"
        };

        [
            self.bold("Minigate Configuration"),
            "─".repeat(RULE_WIDTH),
            format!("Base URL:      {}", settings.base_url()),
            format!("Allowed hosts: {hosts}"),
            format!("Token backend: {}", settings.token_backend),
            format!("Mock launch:   {mock}"),
            format!("Log level:     {}", settings.log_level),
        ]
        .join("\n")
    }

    fn status(&self, status: &str) -> String {
        match status.to_ascii_uppercase().as_str() {
            "SUCCESS" | "CONFIRMED" => self.green(status),
            "FAILED" | "REJECTED" => self.red(status),
            _ => self.yellow(status),
        }
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

fn field(value: Option<&String>) -> &str {
    value.map_or(PLACEHOLDER, String::as_str)
}
