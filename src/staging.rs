// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local staging area for raw downloaded payloads.
//!
//! Layout: `<root>/<kind_dir>/<key>.json`. Files are written once per kind and
//! key (a re-download overwrites) and are never deleted by the import path.

use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::RecordKind;

/// Staging failure.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The staging area cannot be listed, read or written.
    #[error("Staging area unreadable at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staged file exists but does not hold valid JSON.
    #[error("Staged file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StagingError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StagingError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// I/O errors end an import run; a bad file only fails itself.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StagingError::Io { .. })
    }
}

/// One staged payload file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub kind: RecordKind,
    /// File stem, e.g. `2024-01-01` or `42_details`.
    pub key: String,
    pub path: PathBuf,
}

/// Directory-backed staging store.
#[derive(Debug, Clone)]
pub struct StagingStore {
    root: PathBuf,
}

impl StagingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn kind_dir(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.staging_dir())
    }

    /// Staged files of `kind`, sorted by file name. A missing kind directory
    /// means nothing has been staged yet.
    pub async fn list(&self, kind: RecordKind) -> Result<Vec<StagedFile>, StagingError> {
        let dir = self.kind_dir(kind);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StagingError::io(&dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StagingError::io(&dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // In-progress writes are hidden dot files.
            if key.starts_with('.') {
                continue;
            }
            files.push(StagedFile {
                kind,
                key: key.to_string(),
                path: path.clone(),
            });
        }

        files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(files)
    }

    /// Read and parse one staged file.
    pub async fn read(&self, file: &StagedFile) -> Result<Value, StagingError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| StagingError::io(&file.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StagingError::Parse {
            path: file.path.clone(),
            source,
        })
    }

    /// Write `payload` under `key`, replacing any earlier file.
    ///
    /// The content goes to a temporary file that is renamed into place, so a
    /// concurrent reader sees either the old file or the complete new one.
    pub async fn write(
        &self,
        kind: RecordKind,
        key: &str,
        payload: &Value,
    ) -> Result<PathBuf, StagingError> {
        let dir = self.kind_dir(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StagingError::io(&dir, e))?;

        let name = sanitize_key(key);
        let path = dir.join(format!("{name}.json"));
        let tmp = dir.join(format!(".{name}.json.tmp"));

        let body = serde_json::to_vec_pretty(payload).map_err(|source| StagingError::Parse {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StagingError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StagingError::io(&path, e))?;

        tracing::debug!(%kind, key, path = %path.display(), "Staged payload");
        Ok(path)
    }
}

/// Keys become file names; path separators must not escape the kind dir.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}
