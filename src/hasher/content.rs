use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Content hash used for every blacklist/DNW/index lookup: uppercase hex BLAKE3.
pub fn hash_data(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_ascii_uppercase()
}

pub fn read_full_file(file: &Path) -> io::Result<Vec<u8>> {
    let mut f = File::open(file)?;
    let mut buffer = Vec::new();
    f.read_to_end(&mut buffer)?;
    Ok(buffer)
}

pub fn hash_file(file: &Path) -> io::Result<String> {
    let data = read_full_file(file)?;
    Ok(hash_data(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_hash_is_stable_uppercase_hex() {
        let hash = hash_data(b"archive");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_eq!(hash, hash_data(b"archive"));
        assert_ne!(hash, hash_data(b"archive2"));
    }

    #[test]
    fn test_hash_file_matches_hash_data() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("a.jpg");
        fs::write(&path, b"jpeg bytes").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_data(b"jpeg bytes"));
    }

    #[test]
    fn test_hash_missing_file_is_error() {
        let tmp = tempdir().unwrap();
        assert!(hash_file(&tmp.path().join("missing.jpg")).is_err());
    }
}
