//! Download progress bar

use std::sync::Arc;

use bundle_updater::client::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "[{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}";
const SPINNER_TEMPLATE: &str = "{spinner} {bytes} {msg}";

/// Progress display for archive downloads
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(spinner_style());
        bar.set_message("downloading");
        Self { bar }
    }

    /// Callback feeding this bar; switches to a bar once the size is known
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Arc::new(move |downloaded, total| {
            if let Some(total) = total {
                if bar.length() != Some(total) {
                    bar.set_length(total);
                    bar.set_style(bar_style());
                }
            }
            bar.set_position(downloaded);
        })
    }

    pub fn finish(&self) {
        if self.bar.position() > 0 {
            self.bar.finish_with_message("done");
        } else {
            self.bar.finish_and_clear();
        }
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"))
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
