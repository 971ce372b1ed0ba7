use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::pagination::ListQuery;
use crate::interviews::validation::{InterviewPatch, NewInterview};
use crate::models::interview::Interview;

/// One window of a listing plus the count of every matching record.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<Interview>,
    pub total: u64,
}

/// Persistence for interview records.
///
/// Each call touches at most one record and is atomic for that record.
/// Concurrent updates to the same id are last-write-wins.
#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Assigns `id`, `created_at` and `updated_at`, then persists.
    async fn insert(&self, new: NewInterview) -> Result<Interview, AppError>;

    /// Records ordered newest `created_at` first, windowed by `query`.
    async fn list_page(&self, query: &ListQuery) -> Result<Page, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError>;

    /// Merges `patch` into the stored record and refreshes `updated_at`.
    async fn update_by_id(
        &self,
        id: Uuid,
        patch: InterviewPatch,
    ) -> Result<Option<Interview>, AppError>;

    /// Removes the record and hands it back.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError>;

    /// Releases backend resources. Called once on shutdown.
    async fn close(&self);
}
