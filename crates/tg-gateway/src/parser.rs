//! `/cmd arg1 arg2` tokenizer and `Command` envelope builder, ported from
//! `original_source/tg_gateway/src/parser.cpp`.

use soulscout_core::command::{Command, CommandFrom, Role};

const VALID_COMMANDS: &[&str] = &[
    "start",
    "help",
    "balance",
    "holdings",
    "signals",
    "silence",
    "resume",
    "health",
    "add_wallet",
    "remove_wallet",
    "guest",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub cmd: String,
    pub args: Vec<String>,
}

pub fn parse(text: &str) -> Result<ParsedCommand, String> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return Err("Not a command".to_string());
    }
    let body = &trimmed[1..];
    let mut tokens = body.split_whitespace();
    let cmd = tokens.next().unwrap_or("").to_string();
    if cmd.is_empty() {
        return Err("Empty command".to_string());
    }
    let args: Vec<String> = tokens.map(|t| t.to_string()).collect();

    if !is_valid_command(&cmd) {
        return Err(format!("Unknown command: /{cmd}"));
    }
    Ok(ParsedCommand { cmd, args })
}

fn is_valid_command(cmd: &str) -> bool {
    VALID_COMMANDS.contains(&cmd)
}

/// Builds the `cmd.requests` envelope, including the per-command
/// argument-shaping branches from `parser.cpp::to_request_json`.
pub fn to_command_envelope(parsed: &ParsedCommand, tg_user_id: i64, role: Role, corr_id: String) -> Command {
    let args = match parsed.cmd.as_str() {
        "signals" => {
            let mut obj = serde_json::Map::new();
            if let Some(window) = parsed.args.first() {
                obj.insert("window".to_string(), serde_json::Value::String(window.clone()));
            }
            serde_json::Value::Object(obj)
        }
        "silence" | "guest" => {
            let minutes = parsed
                .args
                .first()
                .and_then(|a| a.parse::<i64>().ok())
                .unwrap_or(30);
            serde_json::json!({ "minutes": minutes })
        }
        "add_wallet" | "remove_wallet" => {
            let mut obj = serde_json::Map::new();
            if let Some(address) = parsed.args.first() {
                obj.insert("address".to_string(), serde_json::Value::String(address.clone()));
            }
            serde_json::Value::Object(obj)
        }
        "holdings" => {
            let limit = parsed.args.first().and_then(|a| a.parse::<i64>().ok()).unwrap_or(10);
            serde_json::json!({ "limit": limit })
        }
        _ => serde_json::json!({}),
    };

    Command::new(parsed.cmd.clone(), corr_id, CommandFrom { tg_user_id, role }, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_commands() {
        assert!(parse("hello there").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse("/nonsense").is_err());
    }

    #[test]
    fn parses_command_and_args() {
        let parsed = parse("/signals 24h").unwrap();
        assert_eq!(parsed.cmd, "signals");
        assert_eq!(parsed.args, vec!["24h".to_string()]);
    }

    #[test]
    fn silence_defaults_to_30_minutes_without_args() {
        let parsed = parse("/silence").unwrap();
        let env = to_command_envelope(&parsed, 1, Role::Owner, "c1".to_string());
        assert_eq!(env.args["minutes"], 30);
    }

    #[test]
    fn silence_uses_given_minutes() {
        let parsed = parse("/silence 45").unwrap();
        let env = to_command_envelope(&parsed, 1, Role::Owner, "c1".to_string());
        assert_eq!(env.args["minutes"], 45);
    }

    #[test]
    fn holdings_defaults_limit_to_10() {
        let parsed = parse("/holdings").unwrap();
        let env = to_command_envelope(&parsed, 1, Role::Owner, "c1".to_string());
        assert_eq!(env.args["limit"], 10);
    }

    #[test]
    fn add_wallet_carries_address() {
        let parsed = parse("/add_wallet abc123").unwrap();
        let env = to_command_envelope(&parsed, 1, Role::Owner, "c1".to_string());
        assert_eq!(env.args["address"], "abc123");
    }
}
