//! Calculation history persistence
//!
//! History is append-and-delete only: a saved result is never edited.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use shared::models::CalculationResult;

use crate::error::AppResult;

mod local;
mod postgres;

pub use local::LocalHistoryStore;
pub use postgres::PostgresHistoryStore;

/// Per-user store of calculation results
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Human-readable backend name for health checks
    fn backend(&self) -> &'static str;

    /// Persist a result verbatim and return its id
    ///
    /// Ids are unique across all users; saving an id already stored fails with
    /// [`AppError::Conflict`](crate::error::AppError::Conflict).
    async fn save(&self, user_id: Uuid, result: &CalculationResult) -> AppResult<Uuid>;

    /// All results of a user, newest first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CalculationResult>>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CalculationResult>>;

    /// False when the user owns no result with that id
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool>;
}

pub type SharedHistoryStore = Arc<dyn HistoryStore>;
