//! Scoped temporary artifacts for render output.
//!
//! Every generation renders into a uniquely named temporary file. The store
//! allocates the name and reserves it on disk; the handle owns the file for
//! the duration of one request and deletes it exactly once, either after the
//! poster's bytes have been consumed or on the failure path that abandoned
//! it. Dropping an unreleased handle reclaims the file as a backstop.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Reservation attempts before giving up on name collisions.
const RESERVE_ATTEMPTS: u32 = 4;

// ============================================================================
// Errors
// ============================================================================

/// Failures while allocating a render target.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The scratch directory could not be created.
    #[error("Failed to create scratch directory {path}: {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A fresh path could not be reserved.
    #[error("Failed to reserve artifact {path}: {source}")]
    Reserve {
        /// Path that was being reserved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

// ============================================================================
// Store
// ============================================================================

/// Allocates uniquely named temporary files for render output.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    scratch_dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given scratch directory.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// The directory artifacts are allocated under.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Allocate a fresh render target.
    ///
    /// The returned path did not exist before this call. The name is
    /// reserved with `create_new`, so two concurrent allocations can never
    /// hand out the same path.
    pub async fn allocate(&self) -> Result<ArtifactHandle, ArtifactError> {
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| ArtifactError::CreateDir {
                path: self.scratch_dir.clone(),
                source,
            })?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let path = self
                .scratch_dir
                .join(format!("poster-{}.png", Uuid::new_v4()));

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "Allocated render artifact");
                    return Ok(ArtifactHandle {
                        path,
                        released: false,
                    });
                }
                // A v4 collision is effectively impossible; retry rather
                // than clobber a live render target.
                Err(source)
                    if source.kind() == ErrorKind::AlreadyExists
                        && attempts < RESERVE_ATTEMPTS =>
                {
                    tracing::warn!(path = %path.display(), "Artifact name collision, retrying");
                }
                Err(source) => return Err(ArtifactError::Reserve { path, source }),
            }
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Exclusive ownership of one temporary render target.
///
/// Not `Clone`: exactly one owner exists per generation, and the file is
/// deleted at most once.
#[derive(Debug)]
pub struct ArtifactHandle {
    path: PathBuf,
    released: bool,
}

impl ArtifactHandle {
    /// Where the artifact lives.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has already been deleted.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete the artifact.
    ///
    /// Idempotent: a second call, or a call after the file is already gone,
    /// does nothing. Unexpected deletion failures are logged, not raised.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Released render artifact"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to delete artifact: {}", e);
            }
        }
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(path = %self.path.display(), "Reclaiming artifact on drop");
            self.release();
        }
    }
}
