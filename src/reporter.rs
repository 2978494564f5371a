use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use archive_keeper::pipeline::{StatsSnapshot, UNKNOWN_ETA};
use archive_keeper::ProgressReporter;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Prune phase: progress bar over the indexed paths
/// - Scan phase: spinner showing the current directory
/// - Hash phase: progress bar with the window-based ETA in the message
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
    eta: Mutex<String>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            eta: Mutex::new(UNKNOWN_ETA.to_string()),
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn counter(template: &str, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_prune_start(&self, total: usize) {
        self.set_bar(Self::counter(
            "  {spinner:.cyan} Pruning [{bar:30.cyan/dim}] {pos}/{len} indexed files",
            total,
        ));
    }

    fn on_prune_progress(&self, checked: usize, _total: usize) {
        if let Some(pb) = self.bar().as_ref() {
            pb.set_position(checked as u64);
        }
    }

    fn on_prune_complete(&self, pruned: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Prune complete: {} missing files removed in {:.2}s",
            pruned, duration_secs
        );
    }

    fn on_scan_start(&self) {
        self.set_bar(Self::spinner("Scanning files..."));
    }

    fn on_scan_path(&self, current_path: &str) {
        if let Some(pb) = self.bar().as_ref() {
            pb.set_message(format!("Scanning {}", current_path));
        }
    }

    fn on_scan_complete(&self, to_index: usize, skipped: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files to check, {} skipped in {:.2}s",
            to_index, skipped, duration_secs
        );
    }

    fn on_hash_start(&self, total_files: usize) {
        self.set_bar(Self::counter(
            "  {spinner:.cyan} Hashing [{bar:30.cyan/dim}] {pos}/{len} files ({msg} remaining)",
            total_files,
        ));
        if let Some(pb) = self.bar().as_ref() {
            pb.set_message(UNKNOWN_ETA);
        }
    }

    fn on_hash_progress(&self, stats: &StatsSnapshot) {
        let eta = self.eta.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(pb) = self.bar().as_ref() {
            pb.set_position((stats.hashed + stats.read_failures) as u64);
            pb.set_message(eta);
        }
    }

    fn on_eta(&self, eta: &str) {
        *self.eta.lock().unwrap_or_else(|p| p.into_inner()) = eta.to_string();
    }

    fn on_hash_complete(&self, stats: &StatsSnapshot, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Hash complete: {} files in {:.2}s",
            stats.hashed, duration_secs
        );
    }

    fn on_move_complete(&self, moved: usize) {
        eprintln!("  \x1b[32m✓\x1b[0m Moved {} flagged directories", moved);
    }
}
