//! Clock text for the `elapsed/total` timer.

/// `m:ss` for a time in seconds. Seconds are truncated and padded with a
/// leading zero only below 10. Missing or non-finite input renders `0:00`.
pub fn format_clock(seconds: Option<f64>) -> String {
    let secs = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 0.0,
    };
    let minutes = (secs / 60.0).trunc() as u64;
    let rest = (secs - 60.0 * minutes as f64).trunc() as u64;
    if rest < 10 {
        format!("{minutes}:0{rest}")
    } else {
        format!("{minutes}:{rest}")
    }
}

/// `elapsed/total`, e.g. `1:05/2:05`.
pub fn timer_text(current: Option<f64>, duration: Option<f64>) -> String {
    format!("{}/{}", format_clock(current), format_clock(duration))
}
