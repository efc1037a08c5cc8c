//! In-memory image store for tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::Mutex;

use super::{ImageStorageError, ImageStorageResult, ImageStore};

/// Object held by [`InMemoryImageStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Raw bytes
    pub data: Bytes,
    /// Content type recorded at upload
    pub content_type: String,
}

/// [`ImageStore`] backed by a map, listing keys in ascending order like S3
#[derive(Debug)]
pub struct InMemoryImageStore {
    base_url: String,
    objects: Mutex<BTreeMap<String, StoredImage>>,
    provisioned: AtomicBool,
    unavailable: bool,
}

impl InMemoryImageStore {
    /// Creates an empty store whose URLs start with `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(BTreeMap::new()),
            provisioned: AtomicBool::new(false),
            unavailable: false,
        }
    }

    /// Creates a store whose every operation fails
    #[must_use]
    pub fn unavailable(base_url: impl Into<String>) -> Self {
        Self {
            unavailable: true,
            ..Self::new(base_url)
        }
    }

    /// Snapshot of the stored objects by key
    pub async fn objects(&self) -> BTreeMap<String, StoredImage> {
        self.objects.lock().await.clone()
    }

    /// Whether `ensure_container` has succeeded at least once
    pub fn is_provisioned(&self) -> bool {
        self.provisioned.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> ImageStorageResult<()> {
        if self.unavailable {
            return Err(ImageStorageError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn ensure_container(&self) -> ImageStorageResult<()> {
        self.check_available()?;
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn put_image(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> ImageStorageResult<String> {
        self.check_available()?;

        self.objects.lock().await.insert(
            name.to_string(),
            StoredImage {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(format!("{}/{name}", self.base_url))
    }

    async fn list_image_urls(&self) -> ImageStorageResult<Vec<String>> {
        self.check_available()?;

        Ok(self
            .objects
            .lock()
            .await
            .keys()
            .map(|key| format!("{}/{key}", self.base_url))
            .collect())
    }
}
