pub mod content;

pub use content::{hash_data, hash_file, read_full_file};
