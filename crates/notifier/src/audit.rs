//! Builds `audit` stream entries for alert decisions, grounded on
//! `original_source/notifier/src/audit.cpp`.

use serde_json::json;
use soulscout_core::command::AuditEvent;

pub fn build_audit_event(kind: &str, band: &str, symbol: &str, reason_hash: &str) -> AuditEvent {
    AuditEvent::new(
        "notifier",
        kind,
        json!({
            "band": band,
            "symbol": symbol,
            "reason_hash": reason_hash,
        }),
    )
}
