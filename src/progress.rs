//! Progress reporting (SPEC_FULL.md §6): "analyzers tick once per file
//! processed and once per coarse stage completed." A single atomic counter
//! optionally wired through the cancellation token.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ProgressTracker {
    multi: Arc<MultiProgress>,
    files_done: Arc<AtomicU64>,
    enabled: bool,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            files_done: Arc::new(AtomicU64::new(0)),
            enabled,
        }
    }

    pub fn tick_file(&self) {
        self.files_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files_done(&self) -> u64 {
        self.files_done.load(Ordering::Relaxed)
    }

    pub fn stage_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    pub fn file_progress(&self, total_files: u64, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total_files));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec}")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn clear(&self) {
        if self.enabled {
            let _ = self.multi.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_tracker_still_counts_ticks() {
        let tracker = ProgressTracker::new(false);
        tracker.tick_file();
        tracker.tick_file();
        assert_eq!(tracker.files_done(), 2);
    }

    #[test]
    fn disabled_tracker_produces_hidden_bars() {
        let tracker = ProgressTracker::new(false);
        assert!(tracker.file_progress(10, "scanning").is_hidden());
    }
}
