pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod lists;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod scanner;
pub mod storage;

pub use config::{AppConfig, PipelineSettings};
pub use engine::{DnwDisposition, ManageFilesEngine, ManageOptions, RunReport};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
