pub mod deleter;
pub mod entry;
pub mod filter;
pub mod group;
pub mod loader;

pub use deleter::{delete_selected, DeleteOutcome};
pub use entry::DuplicateEntry;
pub use filter::{filter_groups, FilterMode};
pub use group::DuplicateGroup;
pub use loader::load_duplicates;

use std::collections::HashMap;
use std::path::PathBuf;

/// Location tag -> mount root of that location on this machine.
pub type TagMounts = HashMap<String, PathBuf>;
