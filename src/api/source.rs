//! Where reference data comes from: the live API or a saved snapshot

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::client::GoApiClient;
use super::models::ReferenceData;

#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    async fn load(&self) -> Result<ReferenceData>;

    /// Human readable origin for log lines
    fn describe(&self) -> String;
}

#[async_trait]
impl ReferenceDataSource for GoApiClient {
    async fn load(&self) -> Result<ReferenceData> {
        self.fetch_reference_data().await
    }

    fn describe(&self) -> String {
        self.base_url().to_string()
    }
}

/// Snapshot written by `fetch-reference-data`, for offline generation
#[derive(Debug, Clone)]
pub struct FileReferenceSource {
    path: PathBuf,
}

impl FileReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReferenceDataSource for FileReferenceSource {
    async fn load(&self) -> Result<ReferenceData> {
        debug!("Reading reference data from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read reference data: {:?}", self.path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse reference data: {:?}", self.path))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub async fn save_snapshot(data: &ReferenceData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let content = serde_json::to_string_pretty(data).context("Failed to serialize reference data")?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write reference data: {:?}", path))?;

    info!("Reference data saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::DisasterType;

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reference.json");
        let data = ReferenceData {
            disaster_types: vec![DisasterType { id: 4, name: "Cyclone".into() }],
            ..ReferenceData::default()
        };

        save_snapshot(&data, &path).await.unwrap();
        let source = FileReferenceSource::new(&path);
        assert_eq!(source.load().await.unwrap(), data);
        assert!(source.describe().ends_with("reference.json"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_an_error() {
        let source = FileReferenceSource::new("/nonexistent/reference.json");
        assert!(source.load().await.is_err());
    }
}
