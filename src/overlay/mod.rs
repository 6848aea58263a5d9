use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Transient progress indicator on stderr. Cleared when dropped, so an early
/// return on error still removes it.
pub struct Overlay {
    pb: ProgressBar,
}

impl Overlay {
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn spinner(enabled: bool, message: &str) -> Self {
        if !enabled {
            return Self::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template(":: {spinner} {msg} :: [{elapsed_precise}]")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        Self { pb }
    }

    pub fn bar(enabled: bool, len: u64, message: &str) -> Self {
        if !enabled {
            return Self::hidden();
        }
        let pb = ProgressBar::new(len.max(1));
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.enable_steady_tick(Duration::from_millis(200));
        if let Ok(style) = ProgressStyle::with_template(
            ":: Progress: [{pos}/{len}] :: Duration: [{elapsed_precise}] :: {msg}",
        ) {
            pb.set_style(style.progress_chars(r#"#>-"#));
        }
        pb.set_message(message.to_string());
        Self { pb }
    }

    /// Marks `index` (0-based) as the item in flight.
    pub fn step(&self, index: usize, label: &str) {
        self.pb.set_position(index as u64);
        self.pb.set_message(label.to_string());
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn advance(&self) {
        self.pb.inc(1);
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}
