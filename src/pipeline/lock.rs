// ABOUTME: Deploy lock to prevent concurrent pipeline runs for the same project.
// ABOUTME: Lock files are published whole via hard link and only removed by their owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use crate::types::ServiceName;

/// An unparseable lock younger than this may still be mid-write by another run.
pub const UNSETTLED_GRACE: Duration = Duration::from_secs(60);

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors acquiring or releasing the deploy lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error(
        "deploy lock for {project} is held by {holder} (pid {pid}) since {started_at}; \
         use --force-lock to break it"
    )]
    Held {
        project: String,
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error(
        "deploy lock {} is unreadable and was modified recently; retry or use --force-lock",
        .0.display()
    )]
    Unsettled(PathBuf),

    #[error("deploy lock {} was taken by another process while breaking it", .0.display())]
    Contended(PathBuf),

    #[error("deploy lock {} was taken over by another run; left in place", .0.display())]
    Lost(PathBuf),

    #[error("failed to access deploy lock {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to serialize lock info: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LockError {
    fn io(path: &Path, source: io::Error) -> Self {
        LockError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Project being deployed.
    pub project: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(project: &ServiceName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            project: project.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file for a project.
    pub fn lock_path(state_dir: &Path, project: &ServiceName) -> PathBuf {
        state_dir.join(format!("{}.lock", project))
    }

    fn read(path: &Path) -> io::Result<Result<Self, serde_json::Error>> {
        fs::read_to_string(path).map(|contents| serde_json::from_str(&contents))
    }
}

/// What to do with a lock file found in place.
enum Existing {
    /// Respect it.
    Held(LockInfo),
    /// Unparseable but too recent to break.
    Unsettled,
    /// Break it, provided it still reads as `seen`.
    Break { seen: Option<LockInfo> },
    /// Disappeared while we looked.
    Gone,
}

/// A held deploy lock. Removed on drop if not released explicitly.
#[derive(Debug)]
pub struct DeployLock {
    path: PathBuf,
    owner: LockInfo,
    held: bool,
}

impl DeployLock {
    /// Acquire the deploy lock for `project`.
    ///
    /// The lock file is written in full under a temporary name and then
    /// hard-linked into place, so readers never see a partial file.
    /// Stale (>1 hour) locks and unparseable locks older than
    /// [`UNSETTLED_GRACE`] are broken with a warning; `force` breaks any lock.
    pub fn acquire(
        state_dir: &Path,
        project: &ServiceName,
        force: bool,
    ) -> Result<Self, LockError> {
        fs::create_dir_all(state_dir).map_err(|e| LockError::io(state_dir, e))?;

        let path = LockInfo::lock_path(state_dir, project);
        let owner = LockInfo::new(project);
        let contents = serde_json::to_string(&owner)?;

        match publish(state_dir, &path, &contents) {
            Ok(()) => return Ok(Self::held(path, owner)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(LockError::io(&path, e)),
        }

        match Self::check_existing_lock(&path, force) {
            Existing::Held(existing) => {
                return Err(LockError::Held {
                    project: existing.project,
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            Existing::Unsettled => return Err(LockError::Unsettled(path)),
            Existing::Break { seen } => {
                // Another run may have broken and re-taken the lock meanwhile.
                if let Some(seen) = seen
                    && let Ok(Ok(current)) = LockInfo::read(&path)
                    && current != seen
                {
                    return Err(LockError::Contended(path));
                }
                tracing::debug!("removing stale/forced lock at {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(LockError::io(&path, e)),
                }
            }
            Existing::Gone => {}
        }

        match publish(state_dir, &path, &contents) {
            Ok(()) => Ok(Self::held(path, owner)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(LockError::Contended(path)),
            Err(e) => Err(LockError::io(&path, e)),
        }
    }

    fn held(path: PathBuf, owner: LockInfo) -> Self {
        tracing::debug!("acquired deploy lock {}", path.display());
        Self {
            path,
            owner,
            held: true,
        }
    }

    fn check_existing_lock(path: &Path, force: bool) -> Existing {
        let existing = match LockInfo::read(path) {
            Ok(parsed) => parsed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Existing::Gone,
            Err(_) => return unparseable(path, force),
        };

        match existing {
            Ok(info) if force => {
                tracing::warn!(
                    "breaking lock held by {} (pid {}) since {}",
                    info.holder,
                    info.pid,
                    info.started_at
                );
                Existing::Break { seen: Some(info) }
            }
            Ok(info) if info.is_stale() => {
                tracing::warn!(
                    "auto-breaking stale lock held by {} (pid {}) since {}",
                    info.holder,
                    info.pid,
                    info.started_at
                );
                Existing::Break { seen: Some(info) }
            }
            Ok(info) => Existing::Held(info),
            Err(_) => unparseable(path, force),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    ///
    /// A lock file that now belongs to another run is left in place and
    /// reported as [`LockError::Lost`].
    pub fn release(mut self) -> Result<(), LockError> {
        self.held = false;
        remove_if_owned(&self.path, &self.owner)
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        if self.held {
            let _ = remove_if_owned(&self.path, &self.owner);
        }
    }
}

fn unparseable(path: &Path, force: bool) -> Existing {
    if force {
        tracing::warn!("breaking unreadable lock {}", path.display());
        return Existing::Break { seen: None };
    }

    let age = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok());
    match age {
        Some(age) if age < UNSETTLED_GRACE => Existing::Unsettled,
        _ => {
            tracing::warn!("lock info corrupted, breaking lock");
            Existing::Break { seen: None }
        }
    }
}

fn remove_if_owned(path: &Path, owner: &LockInfo) -> Result<(), LockError> {
    match LockInfo::read(path) {
        Ok(Ok(current)) if current == *owner => {}
        Ok(_) => {
            tracing::warn!("deploy lock {} belongs to another run", path.display());
            return Err(LockError::Lost(path.to_path_buf()));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(LockError::io(path, e)),
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LockError::io(path, e)),
    }
}

/// Write `contents` to a private temp file, then link it to `path`.
///
/// Fails with `AlreadyExists` if `path` exists.
fn publish(state_dir: &Path, path: &Path, contents: &str) -> io::Result<()> {
    let temp = state_dir.join(format!(
        ".{}.{}.{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    fs::write(&temp, contents)?;
    let linked = fs::hard_link(&temp, path);
    let _ = fs::remove_file(&temp);
    linked
}
