//! Utility modules for common functionality

pub mod filesystem;
pub mod filters;
pub mod timeout;

// Re-export commonly used functions
pub use filesystem::{absolutize, clean_path, relative_slash, resolve_within};
pub use filters::{NameFilter, is_go_file, is_test_file, matches_file_type};
pub use timeout::{blocking_with_timeout, with_timeout};
