//! # drivepath-remote
//!
//! Implementations of [`RemoteDrive`](drivepath_core::traits::RemoteDrive):
//!
//! - [`GoogleDriveClient`]: the Drive v3 REST API over `reqwest`.
//! - [`RetryingDrive`]: wraps any drive with the transient-fault retry policy.
//! - [`MemoryDrive`]: an in-memory tree for tests and offline runs.

pub mod auth;
pub mod google;
pub mod memory;
pub mod retry;

pub use auth::{StaticToken, TokenProvider};
pub use google::GoogleDriveClient;
pub use memory::{CallCounts, MemoryDrive, Operation};
pub use retry::RetryingDrive;
