//! # drivepath-service
//!
//! Path-oriented operations over a remote drive. [`DriveService`] resolves
//! slash-delimited paths to resources through an injected [`PathCache`],
//! enumerates folder contents lazily, and performs mutations and transfers
//! while keeping the cache coherent. [`DriveResource`] binds those
//! operations to one resolved resource.
//!
//! Every remote-bound operation takes a [`CallContext`] carrying
//! cancellation and an optional deadline.
//!
//! [`PathCache`]: drivepath_cache::PathCache

pub mod context;
pub mod handle;
pub mod mutate;
pub mod resolve;
pub mod service;
pub mod transfer;
pub mod traverse;

pub use context::CallContext;
pub use handle::DriveResource;
pub use mutate::CopyDestination;
pub use service::DriveService;
pub use traverse::InnerResources;
