//! Duration parsing and formatting.
//!
//! Turns free-form chat text into a total number of seconds and renders a
//! seconds count back into a human-readable "Xd Yh Zm Ws" string. Pure
//! functions, no shared state.

use std::sync::OnceLock;

use regex::Regex;

const SECOND: u64 = 1;
const MINUTE: u64 = 60;
const HOUR: u64 = 3600;
const DAY: u64 = 86400;

/// Unit suffixes and their coefficients in seconds.
const SUFFIXES: [(&str, u64); 4] = [("s", SECOND), ("m", MINUTE), ("h", HOUR), ("d", DAY)];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+[smhd]?").expect("valid token regex"))
}

/// Parse free-form text into a total duration in seconds.
///
/// Scans for maximal digit runs, each optionally followed by one unit letter
/// from `s`/`m`/`h`/`d` (case-insensitive). Tokens with no unit letter count
/// as MINUTES — a deliberate UX default inherited from the original bot, so
/// "45" means 45 minutes, not 45 seconds. Multiple tokens sum: "1h 30" is
/// 3600 + 1800 = 5400 seconds.
///
/// A token that fails to parse as a number (e.g. overflow) contributes zero
/// rather than failing the whole request. Returns `None` only when the text
/// contains no numeric tokens at all, which callers treat as "echo the
/// message back" rather than an error.
pub fn parse_duration_seconds(text: &str) -> Option<u64> {
    let lowered = text.to_lowercase();
    let mut found = false;
    let mut total: u64 = 0;

    for token in token_regex().find_iter(&lowered) {
        found = true;
        total = total.saturating_add(token_seconds(token.as_str()));
    }

    found.then_some(total)
}

fn token_seconds(token: &str) -> u64 {
    for (suffix, coef) in SUFFIXES {
        if let Some(digits) = token.strip_suffix(suffix) {
            return digits
                .parse::<u64>()
                .map(|n| n.saturating_mul(coef))
                .unwrap_or(0);
        }
    }
    // No unit letter: bare numbers are minutes.
    token
        .parse::<u64>()
        .map(|n| n.saturating_mul(MINUTE))
        .unwrap_or(0)
}

/// Format a seconds count as "Xd Yh Zm Ws".
///
/// Leading zero-valued units are suppressed, but once a non-zero unit has
/// been emitted every smaller unit is shown even when zero; seconds always
/// appear. So 3600 renders as "1h 0m 0s", not "1h 0s".
pub fn format_seconds(total: u64) -> String {
    let days = total / DAY;
    let rest = total % DAY;
    let hours = rest / HOUR;
    let rest = rest % HOUR;
    let minutes = rest / MINUTE;
    let seconds = rest % MINUTE;

    let mut out = String::new();

    if days != 0 {
        out.push_str(&format!("{}d ", days));
    }
    if hours != 0 || !out.is_empty() {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes != 0 || !out.is_empty() {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));

    out
}
