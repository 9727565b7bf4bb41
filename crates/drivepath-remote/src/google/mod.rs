//! Google Drive v3 REST client.

pub mod client;
pub mod dto;
pub mod multipart;
pub mod status;

pub use client::GoogleDriveClient;
