//! Terminal progress indicators.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Percent bar for the speech model download/load.
pub fn load_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.set_message("Loading speech model");
    pb
}

/// Spinner with a free-form message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

/// `m:ss` for a playhead position.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clock(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(0.0), "0:00");
        assert_eq!(clock(7.9), "0:07");
        assert_eq!(clock(125.2), "2:05");
        assert_eq!(clock(-3.0), "0:00");
    }
}
