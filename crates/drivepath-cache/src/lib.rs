//! # drivepath-cache
//!
//! Maps normalized remote paths to resource ids and back. The cache is an
//! explicit object owned by whoever resolves paths; it can be hydrated from
//! and flushed to a JSON snapshot.

pub mod path;
pub mod snapshot;
pub mod store;

pub use path::{display_path, join_path, normalize_path, split_path};
pub use store::PathCache;
