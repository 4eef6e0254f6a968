//! Command dispatcher for `/balance`, `/holdings`, `/add_wallet`,
//! `/remove_wallet` (§6 External Interfaces, §8 Portfolio), ported from
//! `original_source/portfolio/src/main.cpp`'s `handle_*_command` functions.
//! Wallet metadata (token symbol/name) caching is a named Non-goal
//! (spec.md §1); holdings are reported by mint address.

use soulscout_core::command::{Command, Reply, Role};

use crate::state::PortfolioState;
use crate::valuation::Holding;
use crate::wallet_registry::is_valid_solana_address;

/// Fetches every tracked wallet's token accounts, prices each into a
/// `Holding`, and returns the valuation summary. Empty wallet registry is
/// the caller's responsibility to handle (distinct "no wallets" message).
async fn collect_and_value(state: &PortfolioState, wallets: &[String]) -> crate::valuation::PortfolioSummary {
    let mut holdings = Vec::new();
    for wallet in wallets {
        for account in state.rpc.get_token_accounts(wallet).await {
            let amount = account.amount as f64 / 10f64.powi(account.decimals as i32);
            let symbol = account.mint.chars().take(6).collect::<String>();
            let mut holding = Holding::unpriced(account.mint.clone(), symbol, amount);
            state.oracle.price_holding(&mut holding).await;
            holdings.push(holding);
        }
    }
    state.valuator.value_portfolio(&holdings)
}

async fn handle_balance(state: &PortfolioState, command: &Command) -> Reply {
    let wallets = state.wallets.list().await;
    if wallets.is_empty() {
        return Reply::err(
            command.corr_id.clone(),
            "No wallets configured. Owner: use /add_wallet <address>",
        );
    }

    let summary = collect_and_value(state, &wallets).await;
    let mut message = format!(
        "Portfolio Balance\n\nTotal: ${:.2} USD\nAssets: {} included",
        summary.total_usd, summary.included_count
    );
    if !summary.notes.is_empty() {
        message.push('\n');
        message.push_str(&summary.notes);
    }
    let data = serde_json::json!({
        "total_usd": summary.total_usd,
        "included_count": summary.included_count,
        "excluded_count": summary.excluded_count,
        "haircut_subtotal_usd": summary.haircut_subtotal_usd,
    });
    Reply::ok(command.corr_id.clone(), message, Some(data))
}

async fn handle_holdings(state: &PortfolioState, command: &Command) -> Reply {
    let wallets = state.wallets.list().await;
    if wallets.is_empty() {
        return Reply::err(command.corr_id.clone(), "No wallets configured.");
    }

    let limit = command
        .args
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(state.config.holdings_default_limit);

    let summary = collect_and_value(state, &wallets).await;
    let mut message = String::from("Top Holdings\n\n");
    for (i, holding) in summary.holdings.iter().take(limit).enumerate() {
        match holding.usd_value {
            Some(v) => message.push_str(&format!("{}. {} - {:.4} (${:.2})\n", i + 1, holding.symbol, holding.amount, v)),
            None => message.push_str(&format!("{}. {} - {:.4} (N/A)\n", i + 1, holding.symbol, holding.amount)),
        }
    }
    if summary.holdings.len() > limit {
        message.push_str(&format!("\n+ {} more...", summary.holdings.len() - limit));
    }
    Reply::ok(command.corr_id.clone(), message, None)
}

async fn handle_add_wallet(state: &PortfolioState, command: &Command) -> Reply {
    if command.from.role != Role::Owner {
        return Reply::err(command.corr_id.clone(), "Only owner can add wallets.");
    }
    let Some(address) = command.args.get("address").and_then(|v| v.as_str()) else {
        return Reply::err(command.corr_id.clone(), "Usage: /add_wallet <address>");
    };
    if !is_valid_solana_address(address) {
        return Reply::err(command.corr_id.clone(), "Invalid Solana address format.");
    }
    if !state.wallets.add(address).await {
        return Reply::err(command.corr_id.clone(), "Failed to add wallet, try again.");
    }
    Reply::ok(
        command.corr_id.clone(),
        format!("Wallet added: {}...", &address[..8.min(address.len())]),
        None,
    )
}

async fn handle_remove_wallet(state: &PortfolioState, command: &Command) -> Reply {
    if command.from.role != Role::Owner {
        return Reply::err(command.corr_id.clone(), "Only owner can remove wallets.");
    }
    let Some(address) = command.args.get("address").and_then(|v| v.as_str()) else {
        return Reply::err(command.corr_id.clone(), "Usage: /remove_wallet <address>");
    };
    if !state.wallets.remove(address).await {
        return Reply::err(command.corr_id.clone(), "Failed to remove wallet, try again.");
    }
    Reply::ok(
        command.corr_id.clone(),
        format!("Wallet removed: {}...", &address[..8.min(address.len())]),
        None,
    )
}

/// Dispatches a command to its handler. Commands this service doesn't own
/// (`/signals`) get an `ok:false` reply so a misrouted request never hangs
/// the caller.
pub async fn handle_command(state: &PortfolioState, command: &Command) -> Reply {
    match command.cmd.as_str() {
        "balance" => handle_balance(state, command).await,
        "holdings" => handle_holdings(state, command).await,
        "add_wallet" => handle_add_wallet(state, command).await,
        "remove_wallet" => handle_remove_wallet(state, command).await,
        other => Reply::err(
            command.corr_id.clone(),
            format!("portfolio does not handle command '{other}'"),
        ),
    }
}
