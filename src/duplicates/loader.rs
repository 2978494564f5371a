use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{DuplicateEntry, DuplicateGroup, TagMounts};
use crate::error::Error;
use crate::storage::ClassificationStore;

/// Build duplicate groups from the store.
///
/// Relative paths are resolved against the mount of their location; records
/// at unmounted locations keep the relative path and are never stat'ed, so
/// they stay invalid wherever the process runs. Groups
/// with fewer than two entries are dropped. With `tag`, only groups with at
/// least one member at that location are kept.
pub fn load_duplicates(
    store: &dyn ClassificationStore,
    tag: Option<&str>,
    mounts: &TagMounts,
) -> Result<Vec<DuplicateGroup>, Error> {
    let records = store.duplicate_records()?;
    debug!("Loaded {} duplicate records", records.len());

    let mut by_hash: BTreeMap<String, DuplicateGroup> = BTreeMap::new();
    for record in records {
        let entry = match mounts.get(&record.location) {
            Some(mount) => {
                DuplicateEntry::new(record.hash.clone(), mount.join(&record.path), record.location)
            }
            None => DuplicateEntry::unresolved(
                record.hash.clone(),
                PathBuf::from(&record.path),
                record.location,
            ),
        };
        by_hash.entry(record.hash).or_default().add_entry(entry);
    }

    let groups: Vec<DuplicateGroup> = by_hash
        .into_values()
        .filter(|g| g.len() >= 2)
        .filter(|g| match tag {
            Some(tag) => g.entries().iter().any(|e| e.location() == tag),
            None => true,
        })
        .map(|mut g| {
            g.sort_by_date();
            g
        })
        .collect();

    info!("Found {} duplicate groups", groups.len());
    Ok(groups)
}
