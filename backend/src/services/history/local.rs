//! JSON-file calculation history for single-machine deployments

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

use shared::models::CalculationResult;

use super::HistoryStore;
use crate::error::{AppError, AppResult};

/// A result together with the user who saved it
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCalculation {
    user_id: Uuid,
    #[serde(flatten)]
    result: CalculationResult,
}

/// All users' history in one file, newest first
pub struct LocalHistoryStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl LocalHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Missing or unreadable history reads as empty
    async fn load(&self) -> Vec<StoredCalculation> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read history file");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt history file");
                Vec::new()
            }
        }
    }

    /// Write through a sibling temp file so readers never see a partial file
    async fn persist(&self, records: &[StoredCalculation]) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StorageError(format!("create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| AppError::StorageError(format!("encode history: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::StorageError(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::StorageError(format!("replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for LocalHistoryStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn save(&self, user_id: Uuid, result: &CalculationResult) -> AppResult<Uuid> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await;

        if records.iter().any(|r| r.result.id == result.id) {
            return Err(AppError::Conflict(format!(
                "Calculation {} already exists",
                result.id
            )));
        }
        let position = records
            .iter()
            .position(|r| r.result.timestamp <= result.timestamp)
            .unwrap_or(records.len());
        records.insert(
            position,
            StoredCalculation {
                user_id,
                result: result.clone(),
            },
        );

        self.persist(&records).await?;
        tracing::debug!(%user_id, calculation_id = %result.id, "Saved calculation to local history");
        Ok(result.id)
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CalculationResult>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.result)
            .collect())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CalculationResult>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await
            .into_iter()
            .find(|r| r.user_id == user_id && r.result.id == id)
            .map(|r| r.result))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await;
        let before = records.len();
        records.retain(|r| !(r.user_id == user_id && r.result.id == id));

        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records).await?;
        Ok(true)
    }
}
