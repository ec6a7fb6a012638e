//! Session-scoped artifact store
//!
//! Layout: `<root>/<session uuid>/<filename>`. No index or metadata files are
//! kept; a track is found again only through the [`Locator`] returned when it
//! was written.
//!
//! Resolution never leaves `<root>/<session uuid>`: session ids must be UUIDs,
//! filenames must be a single plain path component, and the canonical path of
//! the target is checked against the canonical session directory so symlinks
//! cannot escape either.

use moodtune_common::{session_id, Error, Result};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::Locator;

/// Filesystem-backed store rooted at an injected directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

/// A stored file that passed containment checks, opened for reading
#[derive(Debug)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    pub file: tokio::fs::File,
    pub len: u64,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if missing
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Directory backing a session
    pub fn session_dir(&self, session_id: Uuid) -> PathBuf {
        self.root.join(session_id.to_string())
    }

    /// Allocate a fresh session and create its directory.
    ///
    /// Directory creation tolerates an existing directory.
    pub async fn create_session(&self) -> Result<Uuid> {
        let id = session_id::generate();
        tokio::fs::create_dir_all(self.session_dir(id)).await?;
        debug!(session_id = %id, "Session directory created");
        Ok(id)
    }

    /// Write `bytes` to `<session>/<filename>`, replacing any previous file.
    pub async fn write(&self, session_id: Uuid, filename: &str, bytes: &[u8]) -> Result<Locator> {
        if !is_plain_file_name(filename) {
            return Err(Error::InvalidInput(format!(
                "Filename must be a single path component: {:?}",
                filename
            )));
        }

        let dir = self.session_dir(session_id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(Error::NotFound(format!("Session {} does not exist", session_id)));
        }

        tokio::fs::write(dir.join(filename), bytes).await?;

        info!(
            session_id = %session_id,
            filename = %filename,
            bytes = bytes.len(),
            "Artifact written"
        );

        Ok(Locator::new(session_id, filename))
    }

    /// Resolve a (session, filename) pair to an open file inside that session.
    ///
    /// Any id or name that could point outside the session directory, and any
    /// missing file, yields `Error::NotFound`.
    pub async fn resolve(&self, session_id: &str, filename: &str) -> Result<ResolvedArtifact> {
        let not_found = || Error::NotFound(format!("{}/{}", session_id, filename));

        let id = session_id::parse(session_id).ok_or_else(not_found)?;
        if !is_plain_file_name(filename) {
            warn!(
                session_id = %session_id,
                filename = %filename,
                "Rejected artifact path outside session directory"
            );
            return Err(not_found());
        }

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|_| not_found())?;
        let session_dir = tokio::fs::canonicalize(self.session_dir(id))
            .await
            .map_err(|_| not_found())?;
        let path = tokio::fs::canonicalize(session_dir.join(filename))
            .await
            .map_err(|_| not_found())?;

        if !session_dir.starts_with(&root) || !path.starts_with(&session_dir) {
            warn!(
                session_id = %session_id,
                filename = %filename,
                target = %path.display(),
                "Rejected artifact resolving outside session directory"
            );
            return Err(not_found());
        }

        let metadata = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        let file = tokio::fs::File::open(&path).await?;

        Ok(ResolvedArtifact {
            path,
            file,
            len: metadata.len(),
        })
    }

    /// Delete session directories last modified at least `max_age` ago.
    ///
    /// Only UUID-named directories are touched. Returns the number removed.
    pub async fn prune_expired(&self, max_age: Duration) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(session_id::parse) else {
                continue;
            };

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_dir() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!(session_id = %id, error = %e, "Cannot stat session directory");
                    continue;
                }
            };

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();

            if age < max_age {
                continue;
            }

            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => {
                    debug!(session_id = %id, age_secs = age.as_secs(), "Expired session removed");
                    removed += 1;
                }
                Err(e) => warn!(session_id = %id, error = %e, "Failed to remove expired session"),
            }
        }

        if removed > 0 {
            info!(removed, "Pruned expired sessions");
        }

        Ok(removed)
    }
}

/// Run `prune_expired` every `ttl / 4` (at least once a minute) until aborted.
pub fn spawn_session_sweeper(store: ArtifactStore, ttl: Duration) -> JoinHandle<()> {
    let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = store.prune_expired(ttl).await {
                warn!(error = %e, "Session sweep failed");
            }
        }
    })
}

/// True when `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}
