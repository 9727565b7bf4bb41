//! # drivepath-query
//!
//! Builds filter strings in the remote drive's query grammar, and parses
//! them back into an expression tree that can be evaluated locally.

pub mod builder;
pub mod eval;
pub mod expr;
pub mod parse;

pub use builder::{Query, escape};
pub use expr::{Collection, CompareOp, Expr, Field};
pub use parse::parse;
