//! # File I/O Module
//!
//! Study file operations:
//! - **Atomic saves**: write to `.tmp`, sync, rename
//! - **File locking**: one writer per study on shared drives
//! - **Version validation**: refuse files from a newer schema
//!
//! Studies are saved as `.rsa` files containing JSON. Lock files use the
//! `.rsa.lock` extension and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use resilience_core::file_io::{save_study, StudyLock};
//! use resilience_core::study::Study;
//! use std::path::Path;
//!
//! let study = Study::new("Analyst", "RSA-001");
//! let path = Path::new("office.rsa");
//!
//! let lock = StudyLock::acquire(path, "analyst@firm.com").unwrap();
//! save_study(&study, path).unwrap();
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};
use crate::study::{Study, SCHEMA_VERSION};

/// Locks older than this are taken over.
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.rsa.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID holding the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a study file, released on drop.
///
/// Holds an OS-level lock (fs2) on the sidecar file and writes [`LockInfo`]
/// into it so other users can see who is editing.
pub struct StudyLock {
    study_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl StudyLock {
    /// Acquire an exclusive lock on a study file.
    ///
    /// Fails with `FileLocked` when a live lock is held elsewhere.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> ResilienceResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = live_lock(&lock_path) {
            return Err(ResilienceError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| ResilienceError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            ResilienceError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| ResilienceError::serialization(e.to_string()))?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| ResilienceError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| ResilienceError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!("Acquired lock on {}", path.display());
        Ok(StudyLock {
            study_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of a study's lock, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        live_lock(&lock_path_for(path))
    }

    pub fn study_path(&self) -> &Path {
        &self.study_path
    }
}

impl Drop for StudyLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(study_path: &Path) -> PathBuf {
    let mut lock_path = study_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_text(path: &Path, operation: &str) -> ResilienceResult<String> {
    let mut file = File::open(path)
        .map_err(|e| ResilienceError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ResilienceError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Lock info from a sidecar file, unless missing, unreadable or stale.
fn live_lock(lock_path: &Path) -> Option<LockInfo> {
    if !lock_path.exists() {
        return None;
    }
    let info: LockInfo = read_text(lock_path, "read lock")
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())?;
    if is_lock_stale(&info) {
        warn!("Taking over stale lock held by {} on {}", info.user_id, info.machine);
        None
    } else {
        Some(info)
    }
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

/// Save a study with atomic write semantics (tmp file, fsync, rename).
pub fn save_study(study: &Study, path: &Path) -> ResilienceResult<()> {
    let json = serde_json::to_string_pretty(study).map_err(|e| ResilienceError::serialization(e.to_string()))?;

    let tmp_path = path.with_extension("rsa.tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| ResilienceError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| ResilienceError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| ResilienceError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ResilienceError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!("Saved study {} ({} samples)", path.display(), study.sample_count());
    Ok(())
}

/// Load a study and check its schema version.
pub fn load_study(path: &Path) -> ResilienceResult<Study> {
    let contents = read_text(path, "read")?;
    let study: Study = serde_json::from_str(&contents)
        .map_err(|e| ResilienceError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&study.meta.version)?;
    Ok(study)
}

/// Load a study together with the current lock holder, if any.
pub fn load_study_with_lock_check(path: &Path) -> ResilienceResult<(Study, Option<LockInfo>)> {
    let study = load_study(path)?;
    Ok((study, StudyLock::check(path)))
}

/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> ResilienceResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || ResilienceError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [major, ..]) if file_major != major => Err(mismatch()),
        ([0, file_minor, ..], [0, minor, ..]) if file_minor > minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
