//! Application state management

use std::sync::Arc;

use resource_storage::resource::ResourceTable;

use crate::{
    image_storage::ImageStore,
    types::{AppError, Config},
};

/// Application state shared across handlers
///
/// The stores are `None` when no storage credentials were found at startup.
#[derive(Clone)]
pub struct AppState {
    /// Settings read at startup
    pub config: Arc<Config>,
    images: Option<Arc<dyn ImageStore>>,
    resources: Option<Arc<dyn ResourceTable>>,
}

impl AppState {
    /// State with both stores available
    #[must_use]
    pub fn new(
        config: Config,
        images: Arc<dyn ImageStore>,
        resources: Arc<dyn ResourceTable>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            images: Some(images),
            resources: Some(resources),
        }
    }

    /// State for a process started without storage credentials
    #[must_use]
    pub fn without_storage(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            images: None,
            resources: None,
        }
    }

    /// The image store
    ///
    /// # Errors
    ///
    /// Returns a 500 `AppError` when storage is not configured
    pub fn images(&self) -> Result<&Arc<dyn ImageStore>, AppError> {
        self.images.as_ref().ok_or_else(AppError::storage_not_configured)
    }

    /// The resource table
    ///
    /// # Errors
    ///
    /// Returns a 500 `AppError` when storage is not configured
    pub fn resources(&self) -> Result<&Arc<dyn ResourceTable>, AppError> {
        self.resources
            .as_ref()
            .ok_or_else(AppError::storage_not_configured)
    }
}
