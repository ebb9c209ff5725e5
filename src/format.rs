//! Human-readable durations

const UNITS: [(&str, u64); 4] = [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)];

/// Render `seconds` using its two most significant units, e.g. `"2 hours, 5 minutes"`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds_to_human(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "unknown".to_string();
    }
    if seconds < 1.0 {
        return "0 seconds".to_string();
    }

    let mut remaining = seconds as u64;
    let mut parts = Vec::new();
    for (name, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{count} {name}{plural}"));
        }
        if parts.len() == 2 {
            break;
        }
    }
    parts.join(", ")
}
