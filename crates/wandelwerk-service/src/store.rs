// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact store — uploaded and generated files on disk, addressed by
// server-generated UUIDs and deleted a short while after they are served.
//
// The in-memory index is a `std::sync::Mutex<HashMap>` that is only held for
// map operations, never across file I/O or an `.await`. An artifact is indexed
// before its bytes are written, so a request dropped mid-write still purges it.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{Artifact, ArtifactId, ArtifactState, extension_of};

use crate::integrity::hash_bytes;

/// Longest extension kept from a client-supplied file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Extension used when the suggested name has no usable one.
const FALLBACK_EXTENSION: &str = "bin";

/// MIME type for a (sanitized, lowercase) extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "odt" => "application/vnd.oasis.opendocument.text",
        "txt" | "text" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Keep only a short alphanumeric extension from `suggested_name`.
pub fn sanitize_extension(suggested_name: &str) -> String {
    extension_of(suggested_name)
        .filter(|ext| {
            ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_owned())
}

struct StoreInner {
    root: PathBuf,
    index: Mutex<HashMap<ArtifactId, Artifact>>,
}

/// Shared handle to the artifact directory. Cheap to clone.
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<StoreInner>,
}

impl ArtifactStore {
    /// Open (creating if needed) the store rooted at `root`.
    ///
    /// Artifact files left behind by an earlier process are unreachable after
    /// a restart, so they are deleted here.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut swept = 0usize;
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            let path = entry.path();
            let is_artifact = entry.file_type()?.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(ArtifactId::from_reference)
                    .is_some();
            if is_artifact {
                match fs::remove_file(&path) {
                    Ok(()) => swept += 1,
                    Err(err) => warn!(path = %path.display(), %err, "Could not sweep stale artifact"),
                }
            }
        }

        info!(swept, "Artifact store opened");
        Ok(Self {
            inner: Arc::new(StoreInner {
                root,
                index: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Number of live artifacts.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist `bytes` under a fresh identifier.
    ///
    /// Only the extension of `suggested_name` is reused, and only after
    /// sanitising; the file itself is created with create-new semantics.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub async fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<Artifact> {
        let artifact = self.reserve(bytes, suggested_name);
        self.write_reserved(&artifact, bytes).await?;
        Ok(artifact)
    }

    /// Index a new artifact for `bytes` without touching the disk.
    fn reserve(&self, bytes: &[u8], suggested_name: &str) -> Artifact {
        let id = ArtifactId::new();
        let ext = sanitize_extension(suggested_name);
        let artifact = Artifact {
            id,
            mime_type: mime_for_extension(&ext).to_owned(),
            storage_path: self.inner.root.join(format!("{id}.{ext}")),
            created_at: Utc::now(),
            state: ArtifactState::Stored,
            size_bytes: bytes.len() as u64,
            sha256: hash_bytes(bytes),
        };
        self.index().insert(id, artifact.clone());
        artifact
    }

    /// Write the bytes of a reserved artifact. On failure the artifact is
    /// dropped from the index again.
    async fn write_reserved(&self, artifact: &Artifact, bytes: &[u8]) -> Result<()> {
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&artifact.storage_path)
            .await;
        let mut file = match opened {
            Ok(file) => file,
            Err(err) => {
                // The path is not ours to delete.
                self.index().remove(&artifact.id);
                return Err(err.into());
            }
        };

        let written = match file.write_all(bytes).await {
            Ok(()) => file.flush().await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            drop(file);
            warn!(id = %artifact.id, %err, "Artifact write failed");
            self.purge(artifact.id);
            return Err(err.into());
        }

        debug!(id = %artifact.id, sha256 = %artifact.sha256, "Artifact stored");
        Ok(())
    }

    /// Look up a live artifact.
    pub fn resolve(&self, id: ArtifactId) -> Result<Artifact> {
        self.index()
            .get(&id)
            .cloned()
            .ok_or(WandelwerkError::NotFound(id))
    }

    /// Record that a reference to `id` has been handed out.
    pub fn mark_served(&self, id: ArtifactId) -> Result<()> {
        let mut index = self.index();
        let artifact = index.get_mut(&id).ok_or(WandelwerkError::NotFound(id))?;
        artifact.state = ArtifactState::Served;
        Ok(())
    }

    /// Delete `ids` after `after` on an independent task.
    pub fn schedule_cleanup(&self, ids: Vec<ArtifactId>, after: Duration) -> JoinHandle<()> {
        let store = self.clone();
        debug!(count = ids.len(), delay_ms = after.as_millis() as u64, "Cleanup scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            for id in ids {
                store.purge(id);
            }
        })
    }

    /// Delete `id` now. Returns whether it was still live.
    ///
    /// A missing backing file is logged, not escalated.
    pub fn purge(&self, id: ArtifactId) -> bool {
        let Some(artifact) = self.index().remove(&id) else {
            return false;
        };

        match fs::remove_file(&artifact.storage_path) {
            Ok(()) => debug!(id = %id, "Artifact deleted"),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(id = %id, "Artifact file was already gone");
            }
            Err(err) => {
                warn!(id = %id, path = %artifact.storage_path.display(), %err, "Artifact deletion failed");
            }
        }
        true
    }

    /// Start a scoped set of artifacts that is purged unless released.
    pub fn guard(&self) -> ArtifactGuard {
        ArtifactGuard {
            store: self.clone(),
            ids: Vec::new(),
            released: false,
        }
    }

    fn index(&self) -> MutexGuard<'_, HashMap<ArtifactId, Artifact>> {
        self.inner
            .index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Artifacts written on behalf of one request.
///
/// Dropping the guard without [`ArtifactGuard::release_to_cleanup`] purges
/// everything it stored, which covers early returns, errors and a cancelled
/// request future alike.
pub struct ArtifactGuard {
    store: ArtifactStore,
    ids: Vec<ArtifactId>,
    released: bool,
}

impl ArtifactGuard {
    /// Store `bytes` and take responsibility for them.
    pub async fn put(&mut self, bytes: &[u8], suggested_name: &str) -> Result<Artifact> {
        let artifact = self.store.reserve(bytes, suggested_name);
        self.ids.push(artifact.id);
        self.store.write_reserved(&artifact, bytes).await?;
        Ok(artifact)
    }

    /// Mark every artifact served and hand them to deferred cleanup.
    pub fn release_to_cleanup(mut self, after: Duration) -> JoinHandle<()> {
        for id in &self.ids {
            if let Err(err) = self.store.mark_served(*id) {
                warn!(id = %id, %err, "Artifact vanished before it was served");
            }
        }
        self.released = true;
        self.store.schedule_cleanup(std::mem::take(&mut self.ids), after)
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.released || self.ids.is_empty() {
            return;
        }
        debug!(count = self.ids.len(), "Purging artifacts of a failed request");
        for id in self.ids.drain(..) {
            self.store.purge(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_in(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn extensions_are_sanitized() {
        assert_eq!(sanitize_extension("Holiday.JPG"), "jpg");
        assert_eq!(sanitize_extension("../../etc/passwd"), "bin");
        assert_eq!(sanitize_extension("evil.p/df"), "bin");
        assert_eq!(sanitize_extension("archive.tar.verylongext"), "bin");
        assert_eq!(sanitize_extension("noext"), "bin");
    }

    #[tokio::test]
    async fn put_uses_fresh_names_and_records_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();

        let a = store.put(b"same bytes", "report.pdf").await.unwrap();
        let b = store.put(b"same bytes", "report.pdf").await.unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.storage_path, b.storage_path);
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(a.mime_type, "application/pdf");
        assert_eq!(a.state, ArtifactState::Stored);
        assert!(a.reference().starts_with("/convert/"));
        assert!(a.reference().ends_with(".pdf"));
        assert_eq!(fs::read(&a.storage_path).unwrap(), b"same bytes");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn reference_round_trips_to_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let artifact = store.put(b"x", "x.png").await.unwrap();
        let id = ArtifactId::from_reference(&artifact.reference()).unwrap();
        assert_eq!(store.resolve(id).unwrap().storage_path, artifact.storage_path);
    }

    #[tokio::test]
    async fn purge_makes_artifact_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let artifact = store.put(b"bytes", "a.txt").await.unwrap();

        assert!(store.purge(artifact.id));
        assert!(!store.purge(artifact.id));
        assert!(matches!(
            store.resolve(artifact.id),
            Err(WandelwerkError::NotFound(_))
        ));
        assert!(!artifact.storage_path.exists());
    }

    #[tokio::test]
    async fn purge_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let artifact = store.put(b"bytes", "a.txt").await.unwrap();
        fs::remove_file(&artifact.storage_path).unwrap();
        assert!(store.purge(artifact.id));
    }

    #[test]
    fn open_sweeps_stale_artifacts_only() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join(format!("{}.pdf", ArtifactId::new()));
        fs::write(&stale, b"left over").unwrap();
        fs::write(dir.path().join("README"), b"keep me").unwrap();

        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(store.is_empty());
        assert!(!stale.exists());
        assert!(dir.path().join("README").exists());
    }

    #[tokio::test]
    async fn dropped_guard_purges_its_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        {
            let mut guard = store.guard();
            guard.put(b"input", "in.png").await.unwrap();
            guard.put(b"output", "out.jpg").await.unwrap();
            assert_eq!(files_in(dir.path()), 2);
        }
        assert!(store.is_empty());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn failed_write_leaves_nothing_indexed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("artifacts");
        let store = ArtifactStore::open(&root).unwrap();
        fs::remove_dir(&root).unwrap();

        let err = store.put(b"bytes", "a.txt").await.unwrap_err();
        assert!(matches!(err, WandelwerkError::Io(_)));
        assert!(store.is_empty());

        let mut guard = store.guard();
        assert!(guard.put(b"bytes", "b.txt").await.is_err());
        drop(guard);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn released_guard_defers_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let mut guard = store.guard();
        let artifact = guard.put(b"output", "out.webp").await.unwrap();

        let cleanup = guard.release_to_cleanup(Duration::from_millis(50));
        assert_eq!(store.resolve(artifact.id).unwrap().state, ArtifactState::Served);

        cleanup.await.unwrap();
        assert!(matches!(
            store.resolve(artifact.id),
            Err(WandelwerkError::NotFound(_))
        ));
        assert_eq!(files_in(dir.path()), 0);
    }
}
