//! Host facts the checks depend on
//!
//! The storage and AI checks need facts about the host rather than the
//! record store:
//! - whether the storage engine exists at all
//! - how much of the storage quota is used
//! - whether the device reports itself online
//!
//! [`StaticEnvironment`] answers from fixed values; [`HostEnvironment`]
//! inspects the disk holding the data directory.

use crate::error::{DiagnosticsError, DiagnosticsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sysinfo::Disks;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Storage usage estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEstimate {
    /// Bytes used
    pub usage: u64,
    /// Bytes available in total
    pub quota: u64,
}

impl StorageEstimate {
    /// Create an estimate
    #[inline]
    #[must_use]
    pub fn new(usage: u64, quota: u64) -> Self {
        Self { usage, quota }
    }

    /// Percent used, rounded to one decimal; `None` for a zero quota
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn used_percent(&self) -> Option<f64> {
        if self.quota == 0 {
            return None;
        }
        let percent = self.usage as f64 / self.quota as f64 * 100.0;
        Some((percent * 10.0).round() / 10.0)
    }

    /// Megabytes used
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn usage_mb(&self) -> f64 {
        self.usage as f64 / BYTES_PER_MB
    }

    /// Megabytes in total
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn quota_mb(&self) -> f64 {
        self.quota as f64 / BYTES_PER_MB
    }
}

/// Facts about the host the checks depend on
#[async_trait::async_trait]
pub trait Environment: Send + Sync {
    /// Check if a storage engine exists on this host
    fn storage_engine_available(&self) -> bool;

    /// Storage usage, or `None` if the host cannot estimate it
    async fn storage_estimate(&self) -> DiagnosticsResult<Option<StorageEstimate>>;

    /// Check if the device reports network connectivity
    fn is_online(&self) -> bool;
}

/// Environment with fixed answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnvironment {
    engine_available: bool,
    estimate: Result<Option<StorageEstimate>, String>,
    online: bool,
}

impl StaticEnvironment {
    /// Engine available, online, no storage estimate
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine_available: true,
            estimate: Ok(None),
            online: true,
        }
    }

    /// With engine availability
    #[inline]
    #[must_use]
    pub fn with_engine_available(mut self, available: bool) -> Self {
        self.engine_available = available;
        self
    }

    /// With a storage estimate
    #[inline]
    #[must_use]
    pub fn with_storage(mut self, usage: u64, quota: u64) -> Self {
        self.estimate = Ok(Some(StorageEstimate::new(usage, quota)));
        self
    }

    /// With a failing storage estimate
    #[inline]
    #[must_use]
    pub fn with_storage_failure(mut self, reason: impl Into<String>) -> Self {
        self.estimate = Err(reason.into());
        self
    }

    /// With the online flag
    #[inline]
    #[must_use]
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Environment for StaticEnvironment {
    fn storage_engine_available(&self) -> bool {
        self.engine_available
    }

    async fn storage_estimate(&self) -> DiagnosticsResult<Option<StorageEstimate>> {
        self.estimate.clone().map_err(DiagnosticsError::Environment)
    }

    fn is_online(&self) -> bool {
        self.online
    }
}

/// Environment backed by the local machine
///
/// Storage usage is that of the disk whose mount point is the longest
/// prefix of the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    data_dir: PathBuf,
    online: bool,
}

impl HostEnvironment {
    /// Measure the disk holding `data_dir`
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            online: true,
        }
    }

    /// With the online flag; the host has no reliable way to tell
    #[inline]
    #[must_use]
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    /// Data directory
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait::async_trait]
impl Environment for HostEnvironment {
    fn storage_engine_available(&self) -> bool {
        self.data_dir.is_dir()
    }

    async fn storage_estimate(&self) -> DiagnosticsResult<Option<StorageEstimate>> {
        let dir = self
            .data_dir
            .canonicalize()
            .map_err(|e| DiagnosticsError::Environment(format!("{}: {e}", self.data_dir.display())))?;

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .filter(|d| dir.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());

        Ok(disk.map(|d| {
            let quota = d.total_space();
            let usage = quota.saturating_sub(d.available_space());
            tracing::debug!(
                mount = %d.mount_point().display(),
                usage,
                quota,
                "disk usage measured"
            );
            StorageEstimate::new(usage, quota)
        }))
    }

    fn is_online(&self) -> bool {
        self.online
    }
}
