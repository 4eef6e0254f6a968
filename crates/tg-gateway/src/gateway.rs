//! The command-handling pipeline: rate limit -> parse -> auth -> dispatch,
//! ported from `original_source/tg_gateway/src/poller.cpp`'s
//! `handle_message`/`handle_start_command`/`handle_guest_command`/
//! `send_help`. Transport-agnostic: callers supply `chat_id`/`user_id`/
//! `text` however they obtained them (§7: the actual inbound wire format is
//! out of scope, so this is the boundary a real transport adapter would
//! call into).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use soulscout_core::bus::StreamBus;
use soulscout_core::command::{AuditEvent, Role};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::parser;
use crate::state::GatewayState;

/// Mirrors notifier's `outbound.alerts` wire shape closely enough to
/// deserialize it here without depending on the notifier crate.
#[derive(Debug, Deserialize)]
pub struct OutboundAlertView {
    pub symbol: String,
    #[allow(dead_code)]
    pub band: String,
    pub parts: Vec<String>,
}

pub async fn handle_incoming_message(
    state: &GatewayState,
    bus: &StreamBus,
    chat_id: i64,
    user_id: i64,
    text: &str,
    now_ms: i64,
) {
    if !state.rate_limiter.check_and_record(user_id, now_ms) {
        send(state, chat_id, "\u{26A0}\u{FE0F} Rate limit exceeded. Please wait a moment.").await;
        return;
    }

    let parsed = match parser::parse(text) {
        Ok(p) => p,
        Err(e) => {
            send(state, chat_id, &e).await;
            return;
        }
    };

    if parsed.cmd == "start" {
        handle_start_command(state, bus, chat_id, user_id, &parsed.args).await;
        return;
    }

    let mut role = state.auth.authenticate(user_id);
    if role == Role::Unknown && state.guests.is_active(user_id).await {
        role = Role::Guest;
    }
    if role == Role::Unknown {
        send(state, chat_id, "Access denied. This bot is private.").await;
        return;
    }

    if !state.auth.is_command_allowed(&parsed.cmd, role) {
        send(state, chat_id, "\u{26D4} You don't have permission for this command.").await;
        return;
    }

    if parsed.cmd == "help" {
        send(state, chat_id, &help_text(role)).await;
        return;
    }

    if parsed.cmd == "guest" {
        handle_guest_command(state, chat_id, user_id).await;
        return;
    }

    dispatch_command(state, bus, chat_id, user_id, role, &parsed).await;
}

async fn handle_start_command(
    state: &GatewayState,
    bus: &StreamBus,
    chat_id: i64,
    user_id: i64,
    args: &[String],
) {
    if state.auth.authenticate(user_id) == Role::Owner {
        send(state, chat_id, "\u{1F44B} Welcome! You have full access.\n\nSend /help for commands.").await;
        return;
    }

    let Some(pin) = args.first() else {
        send(
            state,
            chat_id,
            "\u{1F512} This bot is private.\n\nIf you have a guest PIN, send: /start <PIN>",
        )
        .await;
        return;
    };

    match state.guests.verify_and_consume_pin(pin).await {
        Some(_issuer) => {
            state.guests.set_session(user_id, state.config.guest_default_minutes * 60).await;
            let event = AuditEvent::new(
                "tg-gateway",
                "guest_login",
                serde_json::json!({"tg_user_id": user_id, "role": "guest"}),
            );
            if let Err(e) = bus.append(&state.config.stream_audit, &event).await {
                warn!(error = %e, "failed to publish guest login audit event");
            }
            send(
                state,
                chat_id,
                "\u{2705} Guest access granted!\n\nYou have read-only access.\nSend /help for commands.",
            )
            .await;
        }
        None => send(state, chat_id, "\u{274C} Invalid or expired PIN.").await,
    }
}

async fn handle_guest_command(state: &GatewayState, chat_id: i64, user_id: i64) {
    let pin = crate::guest::GuestStore::generate_pin();
    let ttl_seconds = state.config.guest_default_minutes * 60;
    state.guests.store_pin(&pin, user_id, ttl_seconds).await;
    send(
        state,
        chat_id,
        &format!(
            "\u{1F511} Guest PIN: <code>{pin}</code>\n\nValid for {} minutes.\nGuest sends: /start {pin}",
            state.config.guest_default_minutes
        ),
    )
    .await;
}

fn help_text(role: Role) -> String {
    let mut text = String::from("<b>SoulScout Commands</b>\n\n");
    text.push_str("<b>Portfolio:</b>\n/balance - View portfolio balance\n/holdings - View top holdings\n\n");
    text.push_str("<b>Signals:</b>\n/signals [24h] - View trading signals\n\n");
    if role == Role::Owner {
        text.push_str("<b>Control (Owner Only):</b>\n");
        text.push_str("/silence [minutes] - Mute alerts\n/resume - Resume alerts\n");
        text.push_str("/add_wallet <address> - Track wallet\n/remove_wallet <address> - Untrack wallet\n");
        text.push_str("/guest [minutes] - Generate guest PIN\n\n");
    }
    text.push_str("<b>System:</b>\n/health - System status\n/help - Show this help");
    text
}

/// Publishes the command envelope and waits (bounded) for its correlated
/// reply, routing the result back to the originating chat.
async fn dispatch_command(
    state: &GatewayState,
    bus: &StreamBus,
    chat_id: i64,
    user_id: i64,
    role: Role,
    parsed: &parser::ParsedCommand,
) {
    let corr_id = uuid::Uuid::new_v4().to_string();
    let envelope = parser::to_command_envelope(parsed, user_id, role, corr_id.clone());

    let (tx, rx) = oneshot::channel();
    state.pending.lock().insert(corr_id.clone(), tx);

    if let Err(e) = bus.append(&state.config.stream_req, &envelope).await {
        error!(error = %e, "failed to publish command");
        state.pending.lock().remove(&corr_id);
        send(state, chat_id, "Failed to submit command, try again shortly.").await;
        return;
    }
    info!(cmd = %parsed.cmd, %corr_id, user_id, "published command");

    let timeout = Duration::from_secs(state.config.reply_timeout_seconds.max(1) as u64);
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(reply)) => send(state, chat_id, &reply.message).await,
        Ok(Err(_)) => send(state, chat_id, "Internal error waiting for reply.").await,
        Err(_) => {
            state.pending.lock().remove(&corr_id);
            send(state, chat_id, "\u{23F3} Still processing, check back shortly.").await;
        }
    }
}

async fn send(state: &GatewayState, chat_id: i64, text: &str) {
    if let Err(e) = state.bot.send_message(chat_id, text).await {
        error!(error = %e, chat_id, "failed to send message");
    }
}

/// Fulfills a pending `dispatch_command` wait when its reply arrives on
/// `cmd.replies`. Drops the reply silently if nothing is waiting (e.g. the
/// requester already timed out).
pub fn fulfill_pending(state: &Arc<GatewayState>, reply: soulscout_core::command::Reply) {
    if let Some(tx) = state.pending.lock().remove(&reply.corr_id) {
        let _ = tx.send(reply);
    } else {
        warn!(corr_id = %reply.corr_id, "reply with no matching waiter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_text_includes_owner_section_only_for_owner() {
        let owner_text = help_text(Role::Owner);
        let guest_text = help_text(Role::Guest);
        assert!(owner_text.contains("Control (Owner Only)"));
        assert!(!guest_text.contains("Control (Owner Only)"));
    }
}
