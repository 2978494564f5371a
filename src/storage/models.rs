/// One row of the file index. The hash is the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub dir_id: i64,
    pub file_id: i64,
    pub hash: String,
    pub size: i64,
    pub location: String,
}

/// A known copy of some content, located by tag and root-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub hash: String,
    pub path: String,
    pub location: String,
}

/// Result of one batched index commit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCommit {
    pub created: usize,
    /// Hash already present; nothing written.
    pub ignored: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashList {
    Dnw,
    Blacklist,
}

impl HashList {
    pub(crate) fn table(self) -> &'static str {
        match self {
            HashList::Dnw => "dnw",
            HashList::Blacklist => "block",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HashList::Dnw => "DNW",
            HashList::Blacklist => "blacklisted",
        }
    }
}
