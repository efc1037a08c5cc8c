//! In-memory resource table for tests

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    ResourceEntity, ResourceRecord, ResourceStorageError, ResourceStorageResult, ResourceTable,
};

/// [`ResourceTable`] backed by a vector, keeping insertion order
#[derive(Debug, Default)]
pub struct InMemoryResourceTable {
    rows: Mutex<Vec<ResourceEntity>>,
    provisioned: AtomicBool,
    unavailable: bool,
}

impl InMemoryResourceTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table whose every operation fails
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Snapshot of the stored rows
    pub async fn rows(&self) -> Vec<ResourceEntity> {
        self.rows.lock().await.clone()
    }

    /// Whether `ensure_table` has succeeded at least once
    pub fn is_provisioned(&self) -> bool {
        self.provisioned.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> ResourceStorageResult<()> {
        if self.unavailable {
            return Err(ResourceStorageError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceTable for InMemoryResourceTable {
    async fn ensure_table(&self) -> ResourceStorageResult<()> {
        self.check_available()?;
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(&self, entity: &ResourceEntity) -> ResourceStorageResult<()> {
        self.check_available()?;

        let mut rows = self.rows.lock().await;
        if rows.iter().any(|row| {
            row.partition_key == entity.partition_key && row.row_key == entity.row_key
        }) {
            return Err(ResourceStorageError::EntityExists {
                partition_key: entity.partition_key.clone(),
                row_key: entity.row_key.clone(),
            });
        }

        rows.push(entity.clone());
        Ok(())
    }

    async fn list(&self) -> ResourceStorageResult<Vec<ResourceRecord>> {
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .cloned()
            .map(ResourceRecord::from)
            .collect())
    }
}
