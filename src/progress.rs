use crate::pipeline::stats::StatsSnapshot;

/// Trait for reporting manage-files progress.
///
/// The CLI implements it with indicatif bars; embedders can forward the calls
/// to their own status widgets. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_prune_start(&self, _total: usize) {}
    fn on_prune_progress(&self, _checked: usize, _total: usize) {}
    fn on_prune_complete(&self, _pruned: usize, _duration_secs: f64) {}
    fn on_scan_start(&self) {}
    fn on_scan_path(&self, _current_path: &str) {}
    fn on_scan_complete(&self, _to_index: usize, _skipped: usize, _duration_secs: f64) {}
    fn on_hash_start(&self, _total_files: usize) {}
    fn on_hash_progress(&self, _stats: &StatsSnapshot) {}
    fn on_eta(&self, _eta: &str) {}
    fn on_hash_complete(&self, _stats: &StatsSnapshot, _duration_secs: f64) {}
    fn on_move_complete(&self, _moved: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
