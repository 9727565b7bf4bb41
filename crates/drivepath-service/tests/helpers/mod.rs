//! Shared test helpers for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use drivepath_cache::PathCache;
use drivepath_core::config::ExportConfig;
use drivepath_remote::MemoryDrive;
use drivepath_service::{CallContext, DriveService};

/// A service over an in-memory drive.
pub struct TestDrive {
    /// The in-memory drive, for seeding and call counts.
    pub drive: Arc<MemoryDrive>,
    /// The path cache injected into the service.
    pub cache: Arc<PathCache>,
    /// The service under test.
    pub service: DriveService,
    /// A fresh context.
    pub ctx: CallContext,
}

impl TestDrive {
    /// Default page size and export limit.
    pub fn new() -> Self {
        Self::build(MemoryDrive::new(), PathCache::new(), ExportConfig::default())
    }

    /// Drive returning `page_size` resources per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::build(
            MemoryDrive::with_page_size(page_size),
            PathCache::new(),
            ExportConfig::default(),
        )
    }

    /// Service with the given export limit.
    pub fn with_export_limit(max_export_bytes: u64) -> Self {
        Self::build(
            MemoryDrive::new(),
            PathCache::new(),
            ExportConfig { max_export_bytes },
        )
    }

    /// Drive whose root folder has the concrete id `root_id`.
    pub fn with_root_folder(root_id: &str) -> Self {
        Self::build(
            MemoryDrive::new().with_root_folder(root_id),
            PathCache::new(),
            ExportConfig::default(),
        )
    }

    /// Service over the given cache.
    pub fn with_cache(cache: PathCache) -> Self {
        Self::build(MemoryDrive::new(), cache, ExportConfig::default())
    }

    fn build(drive: MemoryDrive, cache: PathCache, export: ExportConfig) -> Self {
        let drive = Arc::new(drive);
        let cache = Arc::new(cache);
        let service = DriveService::new(drive.clone(), cache.clone(), export);
        Self {
            drive,
            cache,
            service,
            ctx: CallContext::new(),
        }
    }

    /// Seed `A/B/<name>` and return the ids of A, B and the file.
    pub fn seed_nested(&self, name: &str) -> (String, String, String) {
        let a = self.drive.seed_folder("A", None);
        let b = self.drive.seed_folder("B", Some(&a.id));
        let f = self.drive.seed_file(name, Some(&b.id), "content");
        (a.id, b.id, f.id)
    }
}
