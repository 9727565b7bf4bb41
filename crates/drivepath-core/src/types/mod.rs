//! Core type definitions used across the drivepath workspace.

pub mod kind;
pub mod resource;
pub mod transfer;

pub use kind::{KIND_TABLE, KindEntry, ResourceKind};
pub use resource::{FilePage, ROOT_ID, RemoteResource, ResourceMetadata};
pub use transfer::TransferCallbacks;
