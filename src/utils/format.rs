//! Text helpers shared by the overlay: the time label and the slider
//! gradients that double as the host's volume readout.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static PERCENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("Failed to compile percent pattern"));

/// Format a position in seconds as `MM:SS`.
///
/// Minutes are never rolled over into hours, so an hour and five seconds
/// renders as `60:05`. Non-finite or negative input renders as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }

    let total_secs = seconds.floor() as u64;
    let minutes = total_secs / 60;
    let secs = total_secs % 60;

    format!("{:02}:{:02}", minutes, secs)
}

/// Extract the fill level from a CSS gradient string such as
/// `linear-gradient(to right, white 45%, transparent 45%)`.
///
/// The level is the first nonzero stop; a leading `0%` stop only anchors
/// the fill colour. A gradient whose stops are all zero reads as 0.
///
/// The host's volume slider only exposes its level through this gradient,
/// so a miss is expected while the slider is still being styled.
pub fn gradient_percent(gradient: &str) -> Option<f64> {
    let stops: Vec<f64> = PERCENT_PATTERN
        .captures_iter(gradient)
        .filter_map(|captures| captures[1].parse::<f64>().ok())
        .collect();

    if stops.is_empty() {
        debug!("No percentage found in gradient {:?}", gradient);
        return None;
    }

    let level = stops.iter().copied().find(|stop| *stop > 0.0).unwrap_or(0.0);
    Some(level.clamp(0.0, 100.0))
}

/// Build the two-tone fill used for both overlay sliders.
pub fn progress_gradient(fill: &str, rest: &str, percent: f64) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    format!(
        "linear-gradient(to right, {fill}, {fill} {percent}%, {rest} {percent}%)",
        fill = fill,
        rest = rest,
        percent = percent
    )
}
