use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::pagination::ListQuery;
use crate::interviews::store::{InterviewStore, Page};
use crate::interviews::validation::{InterviewPatch, NewInterview};
use crate::models::interview::Interview;

/// Process-local store. Records live in insertion order behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Interview>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn insert(&self, new: NewInterview) -> Result<Interview, AppError> {
        let record = new.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        info!("Inserted interview record {}", record.id);
        Ok(record)
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Page, AppError> {
        let records = self.records.read().await;

        // Newest insert first, then a stable sort keeps that order for equal timestamps.
        let mut matching: Vec<&Interview> =
            records.iter().rev().filter(|r| query.matches(r)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(Page { items, total })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: InterviewPatch,
    ) -> Result<Option<Interview>, AppError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        patch.apply(record);
        // Never move backwards, even if the clock does.
        record.updated_at = Utc::now().max(record.updated_at);
        info!("Updated interview record {id}");
        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        let mut records = self.records.write().await;
        let removed = records
            .iter()
            .position(|r| r.id == id)
            .map(|idx| records.remove(idx));
        if removed.is_some() {
            info!("Deleted interview record {id}");
        }
        Ok(removed)
    }

    async fn close(&self) {
        let count = self.records.read().await.len();
        info!("Discarding in-memory store with {count} records");
    }
}
