use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Filename prefix marking a file whose hash is on the blacklist.
pub const BLACKLISTED_TAG: &str = "WARNING-";
/// Directory (under the storage root) receiving flagged directories.
pub const BLACKLISTED_DIR: &str = "CHECK";
/// Directory (under the storage root) receiving moved DNW files.
pub const DNW_DIR: &str = "DNW";

/// The drive prefix and root of `path`, e.g. `C:\` or `/`.
pub fn storage_root_of(path: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => root.push(component.as_os_str()),
            _ => break,
        }
    }
    root
}

/// Strip the storage root (or the drive prefix and root) from `path`.
pub fn relative_to_root(path: &Path, storage_root: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(storage_root) {
        return stripped.to_path_buf();
    }
    path.components()
        .skip_while(|comp| matches!(comp, Component::Prefix(_) | Component::RootDir))
        .collect()
}

/// `WARNING-<hash>-<original name>`
pub fn blacklisted_file_name(hash: &str, file_name: &str) -> String {
    format!("{}{}-{}", BLACKLISTED_TAG, hash, file_name)
}

pub fn is_blacklist_tagged(file_name: &str) -> bool {
    file_name.starts_with(BLACKLISTED_TAG)
}

/// Rename `path` in place to its blacklisted name. Returns the new path.
pub fn tag_blacklisted(path: &Path, hash: &str) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;
    let target = path.with_file_name(blacklisted_file_name(hash, &file_name));
    fs::rename(path, &target)?;
    Ok(target)
}

/// Move a file or directory to `<storage_root>/<target_dir>/<path relative to storage_root>`,
/// creating missing parents. Returns the destination.
pub fn move_with_structure(path: &Path, storage_root: &Path, target_dir: &str) -> io::Result<PathBuf> {
    let destination = storage_root
        .join(target_dir)
        .join(relative_to_root(path, storage_root));

    if destination.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", destination.display()),
        ));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(path, &destination)?;
    Ok(destination)
}
