//! # drivepath-core
//!
//! Core crate for drivepath. Contains the remote-drive collaborator trait,
//! configuration schemas, the resource data model with its static MIME
//! table, and the unified error system.
//!
//! This crate has **no** internal dependencies on other drivepath crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
