//! Command dispatcher (§4.10): handles `/signals` requests from
//! `cmd.requests` and replies on `cmd.replies` correlated by `corr_id`.

use soulscout_core::command::{Command, Reply};

use crate::state::AnalyticsState;

const DEFAULT_WINDOW_MINUTES: i64 = 24 * 60;

/// Builds the reply for a `/signals` command. Window argument defaults to
/// 24h; unparsable window arguments fall back to the same default rather
/// than erroring the whole command (user-visible failures stay `ok:false`
/// replies, per §7, but a bad optional arg degrades gracefully instead).
fn handle_signals(state: &AnalyticsState, command: &Command, now_ms: i64) -> Reply {
    let window_minutes = command
        .args
        .get("window")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_WINDOW_MINUTES);
    let window_ms = window_minutes.max(0) * 60_000;

    let alerts = state.recent_alerts_within(window_ms, now_ms);
    let message = if alerts.is_empty() {
        format!("no alerts in the last {window_minutes} minutes")
    } else {
        format!("{} alert(s) in the last {window_minutes} minutes", alerts.len())
    };
    let data = serde_json::to_value(&alerts).ok();
    Reply::ok(command.corr_id.clone(), message, data)
}

/// Dispatches a command to its handler. Unknown commands (this service
/// only owns `/signals`; other commands are routed elsewhere by the
/// messaging gateway) get an `ok:false` reply so a misrouted request never
/// hangs the caller.
pub fn handle_command(state: &AnalyticsState, command: &Command, now_ms: i64) -> Reply {
    match command.cmd.as_str() {
        "signals" => handle_signals(state, command, now_ms),
        other => Reply::err(
            command.corr_id.clone(),
            format!("analytics does not handle command '{other}'"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use soulscout_core::command::{CommandFrom, Role};
    use soulscout_core::model::{AlertRecord, Band};

    fn test_config() -> AnalyticsConfig {
        AnalyticsConfig {
            redis_url: "redis://localhost".to_string(),
            base_threshold: 70.0,
            risk_on_adj: -10,
            risk_off_adj: 10,
            global_actionable_max_per_hour: 5,
            cooldown_actionable_hours: 6.0,
            cooldown_headsup_hours: 1.0,
            reentry_guard_hours: 12.0,
            dedup_ttl_seconds: 21_600,
            watch_window_min: 120,
            pipeline_shards: 1,
            health_port: 8080,
        }
    }

    fn command(cmd: &str, args: serde_json::Value) -> Command {
        Command::new(
            cmd,
            "corr-xyz",
            CommandFrom {
                tg_user_id: 1,
                role: Role::Owner,
            },
            args,
        )
    }

    #[test]
    fn signals_with_no_alerts_reports_empty() {
        let state = AnalyticsState::new(test_config());
        let cmd = command("signals", serde_json::json!({}));
        let reply = handle_command(&state, &cmd, 0);
        assert!(reply.ok);
        assert!(reply.message.contains("no alerts"));
    }

    #[test]
    fn signals_reports_recent_alerts_within_window() {
        let state = AnalyticsState::new(test_config());
        state.push_recent_alert(AlertRecord {
            band: Band::Actionable,
            symbol: "SOL".to_string(),
            price: 1.0,
            confidence: 80,
            lines: vec![],
            plan: "plan".to_string(),
            sol_path: "direct".to_string(),
            est_impact_pct: 0.1,
            corr_id: "c1".to_string(),
            ts_ms: 0,
        });
        let cmd = command("signals", serde_json::json!({ "window": 60 }));
        let reply = handle_command(&state, &cmd, 1000);
        assert!(reply.ok);
        assert!(reply.message.contains("1 alert"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let state = AnalyticsState::new(test_config());
        let cmd = command("balance", serde_json::json!({}));
        let reply = handle_command(&state, &cmd, 0);
        assert!(!reply.ok);
    }
}
