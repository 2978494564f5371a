use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use archive_keeper::duplicates::FilterMode;
use archive_keeper::storage::HashList;
use archive_keeper::DnwDisposition;

#[derive(Debug, Parser)]
#[command(name = "archive-keeper")]
#[command(about = "Hash, classify and deduplicate a tagged media archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Walk a directory, check hashes against the lists and index new files
    Manage(ManageArgs),
    /// Show duplicate groups and optionally delete selected copies
    Duplicates(DuplicatesArgs),
    /// Add the hash of every file in a directory to the DNW list or blacklist
    Lists(ListsArgs),
    /// Register a location tag
    AddTag { tag: String },
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}

#[derive(Debug, Args)]
pub struct ManageArgs {
    /// Directory to process
    pub root: PathBuf,
    /// Location tag the directory belongs to
    #[arg(long)]
    pub tag: String,
    #[arg(long)]
    pub check_blacklist: bool,
    /// Move directories holding blacklisted files into CHECK after the run
    #[arg(long)]
    pub move_only: bool,
    /// What to do with files on the DNW list
    #[arg(long, value_enum)]
    pub dnw: Option<DnwArg>,
    /// Index files whose hash is not known yet
    #[arg(long)]
    pub index: bool,
    /// Skip files whose path is already in the index
    #[arg(long)]
    pub skip_indexed: bool,
    /// Drop index entries whose files are gone before scanning
    #[arg(long)]
    pub prune_index: bool,
    /// Override the storage root (defaults to the filesystem root of ROOT)
    #[arg(long)]
    pub storage_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    /// Only groups with a member at this location
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,
    /// Paths to mark for deletion
    #[arg(long, num_args = 1..)]
    pub select: Vec<PathBuf>,
    /// Delete the selected paths
    #[arg(long)]
    pub delete: bool,
}

#[derive(Debug, Args)]
pub struct ListsArgs {
    pub dir: PathBuf,
    #[arg(long, value_enum)]
    pub list: ListArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DnwArg {
    Log,
    Delete,
    Move,
}

impl From<DnwArg> for DnwDisposition {
    fn from(arg: DnwArg) -> Self {
        match arg {
            DnwArg::Log => DnwDisposition::Log,
            DnwArg::Delete => DnwDisposition::Delete,
            DnwArg::Move => DnwDisposition::Move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Valid,
    Visible,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterMode::All,
            FilterArg::Valid => FilterMode::Valid,
            FilterArg::Visible => FilterMode::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListArg {
    Dnw,
    Blacklist,
}

impl From<ListArg> for HashList {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Dnw => HashList::Dnw,
            ListArg::Blacklist => HashList::Blacklist,
        }
    }
}
