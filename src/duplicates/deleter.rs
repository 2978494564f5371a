use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use super::group::DuplicateGroup;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}

/// Delete every selected file in `group`. Deleted entries leave the group;
/// entries whose deletion failed stay in it, still selected.
pub fn delete_selected(group: &mut DuplicateGroup) -> DeleteOutcome {
    let targets: Vec<PathBuf> = group.selected().map(|e| e.path().to_path_buf()).collect();
    let mut outcome = DeleteOutcome::default();

    for path in targets {
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                group.remove_entry(&path);
                outcome.deleted += 1;
            }
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                outcome.failed += 1;
            }
        }
    }
    outcome
}
