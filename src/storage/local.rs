//! Local filesystem storage implementation.
//!
//! Appends guest records to date-partitioned JSON Lines files.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{GuestProfile, StorageConfig};
use crate::storage::GuestSink;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_prefix: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.output_dir, &config.file_prefix)
    }

    pub fn root_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    /// Path of the partition file for a given day.
    pub fn partition_path(&self, day: NaiveDate) -> PathBuf {
        self.root_dir
            .join(format!("{}-{}.jsonl", self.file_prefix, day.format("%Y-%m-%d")))
    }

    /// Read all records of a day, returning an empty list if none were written.
    pub async fn read_day(&self, day: NaiveDate) -> Result<Vec<GuestProfile>> {
        let path = self.partition_path(day);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl GuestSink for LocalStorage {
    async fn append(&self, profile: &GuestProfile, day: NaiveDate) -> Result<PathBuf> {
        let path = self.partition_path(day);
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let mut line = serde_json::to_vec(profile)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(path)
    }
}
