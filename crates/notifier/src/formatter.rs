//! Alert formatting: builds the human-readable title/body and splits long
//! messages, grounded on `original_source/notifier/src/formatter.cpp`.
//! The transport that actually posts these strings is out of scope
//! (spec.md §1); this only produces the text.

use soulscout_core::command::AlertPayload;

/// Telegram's message length cap; kept as a named constant rather than a
/// magic number per the original's `TELEGRAM_MAX_LENGTH`.
pub const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Clone)]
pub struct FormattedAlert {
    pub text: String,
    pub parts: Vec<String>,
    pub split_required: bool,
}

fn band_display(band: &str) -> String {
    match band {
        "heads_up" => "\u{1F4A1} Heads-up".to_string(),
        "actionable" => "\u{26A1} Actionable".to_string(),
        "high_conviction" => "\u{1F525} High Conviction".to_string(),
        other => other.to_string(),
    }
}

fn build_title(band: &str, symbol: &str, price: f64, confidence: i32) -> String {
    format!("{} BUY — {} @ ${:.6} (C={})", band_display(band), symbol, price, confidence)
}

pub fn format_alert(alert: &AlertPayload) -> FormattedAlert {
    let mut msg = build_title(&alert.severity, &alert.symbol, alert.price, alert.confidence);
    msg.push_str("\n\n");

    for line in &alert.lines {
        msg.push_str("\u{2022} ");
        msg.push_str(line);
        msg.push('\n');
    }
    msg.push('\n');

    msg.push_str("<b>Plan:</b> ");
    msg.push_str(&alert.plan);
    msg.push('\n');

    msg.push_str("<b>Exit to SOL:</b> ");
    msg.push_str(&alert.sol_path);
    msg.push_str(&format!(" (est impact {:.1}%)\n", alert.est_impact_pct));

    msg.push_str(&format!("\n<i>{}</i>", format_timestamp(&alert.ts)));

    let parts = split_if_needed(&msg);
    let split_required = parts.len() > 1;
    FormattedAlert { text: msg, parts, split_required }
}

fn format_timestamp(iso8601: &str) -> &str {
    iso8601.get(0..19).unwrap_or(iso8601)
}

fn split_if_needed(text: &str) -> Vec<String> {
    if text.len() <= MAX_MESSAGE_LEN {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if current.len() + line.len() > MAX_MESSAGE_LEN {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            current.push_str("...(continued)\n\n");
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(lines: Vec<String>) -> AlertPayload {
        AlertPayload {
            severity: "actionable".to_string(),
            symbol: "SOL/USDC".to_string(),
            price: 142.5,
            confidence: 78,
            lines,
            plan: "scale in 25/25/50".to_string(),
            sol_path: "SOL -> USDC".to_string(),
            est_impact_pct: 0.8,
            ts: "2026-07-28T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn builds_title_with_band_emoji() {
        let f = format_alert(&alert(vec!["reason one".to_string()]));
        assert!(f.text.contains("\u{26A1} Actionable"));
        assert!(f.text.contains("SOL/USDC"));
        assert!(f.text.contains("C=78"));
    }

    #[test]
    fn includes_reason_bullets() {
        let f = format_alert(&alert(vec!["reason one".to_string(), "reason two".to_string()]));
        assert!(f.text.contains("\u{2022} reason one"));
        assert!(f.text.contains("\u{2022} reason two"));
    }

    #[test]
    fn short_message_is_not_split() {
        let f = format_alert(&alert(vec!["short".to_string()]));
        assert!(!f.split_required);
        assert_eq!(f.parts.len(), 1);
    }

    #[test]
    fn long_message_is_split_under_the_cap() {
        let many_lines: Vec<String> = (0..400).map(|i| format!("reason line number {i}")).collect();
        let f = format_alert(&alert(many_lines));
        assert!(f.split_required);
        assert!(f.parts.len() > 1);
        for part in &f.parts {
            assert!(part.len() <= MAX_MESSAGE_LEN + "...(continued)\n\n".len());
        }
    }
}
