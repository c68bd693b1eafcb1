//! # rp-store-local
//! repute/crates/rp-plugins/rp-store-local/src/lib.rs
//! Local implementations of `KvStore`.
//! Features: sharded one-file-per-key storage on disk, and an in-memory map.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rp_core::traits::{KvStore, Record};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// On-disk layout of one entry. The key is kept so listings can report it.
#[derive(Serialize, Deserialize)]
struct StoredFile {
    key: String,
    value: String,
    stored_at: DateTime<Utc>,
}

pub struct FileStore {
    /// Root directory for all entries (e.g., "./data/cache")
    root_path: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Generates a sharded path: "ab/cd/abcd...hash.json"
    fn get_sharded_path(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(format!("{hash}.json"));
        path
    }

    async fn read_entry(path: &Path) -> anyhow::Result<Option<StoredFile>> {
        match fs::read(path).await {
            Ok(bytes) => {
                let entry = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt cache file {}", path.display()))?;
                Ok(Some(entry))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Every entry file under the root, depth-first.
    async fn entry_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![self.root_path.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Record>> {
        let path = self.get_sharded_path(key);
        Ok(Self::read_entry(&path).await?.map(|entry| Record {
            value: entry.value,
            stored_at: entry.stored_at,
        }))
    }

    /// Writes through a uniquely named temp file and a rename so readers never see half an
    /// entry and concurrent writers of one key never share a temp file.
    async fn put(&self, key: &str, record: Record) -> anyhow::Result<()> {
        let target_path = self.get_sharded_path(key);
        let parent = target_path
            .parent()
            .context("sharded path always has a parent")?
            .to_path_buf();
        fs::create_dir_all(&parent).await?;

        let body = serde_json::to_vec(&StoredFile {
            key: key.to_string(),
            value: record.value,
            stored_at: record.stored_at,
        })?;
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut tmp = tempfile::Builder::new().suffix(".tmp").tempfile_in(&parent)?;
            tmp.write_all(&body)?;
            tmp.persist(&target_path)
                .with_context(|| format!("replacing {}", target_path.display()))?;
            Ok(())
        })
        .await
        .context("cache write task failed")??;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.get_sharded_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_expired(&self, prefix: &str, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        let mut expired = Vec::new();
        for path in self.entry_files().await? {
            match Self::read_entry(&path).await {
                Ok(Some(entry)) if entry.key.starts_with(prefix) && entry.stored_at <= cutoff => {
                    expired.push(entry.key)
                }
                Ok(_) => {}
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable cache file"),
            }
        }
        Ok(expired)
    }
}

/// Process-local store; contents vanish on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Record>> {
        Ok(self.entries.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, record: Record) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_expired(&self, prefix: &str, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix) && e.value().stored_at <= cutoff)
            .map(|e| e.key().clone())
            .collect())
    }
}
