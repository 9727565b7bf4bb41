//! Core traits defined in `drivepath-core` and implemented by other crates.

pub mod remote;

pub use remote::{ByteStream, RemoteDrive};
