//! Shared command/reply/alert wire envelopes (§6 External Interfaces).
//! These are the typed records carried under each stream entry's `data`
//! field.

use serde::{Deserialize, Serialize};

/// A user's role as resolved by the messaging gateway's authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Guest,
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "owner",
            Role::Guest => "guest",
            Role::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFrom {
    pub tg_user_id: i64,
    pub role: Role,
}

/// `cmd.requests` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: String,
    pub cmd: String,
    pub corr_id: String,
    pub ts: String,
    pub args: serde_json::Value,
    pub from: CommandFrom,
}

impl Command {
    pub fn new(cmd: impl Into<String>, corr_id: impl Into<String>, from: CommandFrom, args: serde_json::Value) -> Self {
        Self {
            kind: "command".to_string(),
            cmd: cmd.into(),
            corr_id: corr_id.into(),
            ts: chrono::Utc::now().to_rfc3339(),
            args,
            from,
        }
    }
}

/// `cmd.replies` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub corr_id: String,
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub ts: String,
}

impl Reply {
    pub fn ok(corr_id: impl Into<String>, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            corr_id: corr_id.into(),
            ok: true,
            message: message.into(),
            data,
            ts: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn err(corr_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            corr_id: corr_id.into(),
            ok: false,
            message: message.into(),
            data: None,
            ts: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Outbound alert wire payload (distinct from the internal `AlertRecord`
/// only in field naming: `severity` instead of `band`, integer confidence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub severity: String,
    pub symbol: String,
    pub price: f64,
    pub confidence: i32,
    pub lines: Vec<String>,
    pub plan: String,
    pub sol_path: String,
    pub est_impact_pct: f64,
    pub ts: String,
}

impl From<crate::model::AlertRecord> for AlertPayload {
    fn from(record: crate::model::AlertRecord) -> Self {
        Self {
            severity: record.band.to_string(),
            symbol: record.symbol,
            price: record.price,
            confidence: record.confidence,
            lines: record.lines,
            plan: record.plan,
            sol_path: record.sol_path,
            est_impact_pct: record.est_impact_pct,
            ts: chrono::DateTime::from_timestamp_millis(record.ts_ms)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// `audit` stream entry: any service may append one when it makes a
/// decision worth recording for later review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub source: String,
    pub kind: String,
    pub detail: serde_json::Value,
    pub ts: String,
}

impl AuditEvent {
    pub fn new(source: impl Into<String>, kind: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            detail,
            ts: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_err_has_no_data() {
        let reply = Reply::err("corr-1", "not found");
        assert!(!reply.ok);
        assert!(reply.data.is_none());
    }

    #[test]
    fn role_display_matches_wire_value() {
        assert_eq!(Role::Owner.to_string(), "owner");
        assert_eq!(Role::Guest.to_string(), "guest");
        assert_eq!(Role::Unknown.to_string(), "unknown");
    }
}
