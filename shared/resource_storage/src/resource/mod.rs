//! Resource table storage module for `DynamoDB` operations

mod error;
#[cfg(any(test, feature = "test-utils"))]
mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::client::Waiters;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, to_item};
use strum::Display;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub use error::{ResourceStorageError, ResourceStorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryResourceTable;

/// Partition used when a resource has no usable category
pub const DEFAULT_CATEGORY: &str = "general";

/// Row key layout, microsecond precision
const ROW_KEY_FORMAT: &str = "%Y%m%dT%H%M%S%6f";

/// `created_at` layout, ISO-8601 UTC with a trailing `Z`
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// How long to wait for a freshly created table to become active
const TABLE_ACTIVE_TIMEOUT: Duration = Duration::from_secs(60);

/// `DynamoDB` attribute names for the resources table
#[derive(Debug, Display)]
pub enum ResourceAttribute {
    /// Hash key, the normalized category
    #[strum(serialize = "PartitionKey")]
    PartitionKey,
    /// Range key, the creation timestamp
    #[strum(serialize = "RowKey")]
    RowKey,
}

/// A resource as written to the table
///
/// Tags are kept in their stored, comma-joined form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceEntity {
    /// Normalized category
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    /// Creation timestamp with microsecond precision
    #[serde(rename = "RowKey")]
    pub row_key: String,
    /// Display name
    pub name: String,
    /// Link to the resource
    pub url: String,
    /// Normalized category, same value as the partition key
    pub category: String,
    /// Comma-joined tags
    pub tags: String,
    /// Free-form notes
    pub notes: String,
    /// ISO-8601 UTC creation time
    pub created_at: String,
}

/// Caller-provided fields of a new resource
#[derive(Debug, Clone, Default)]
pub struct NewResource {
    /// Display name
    pub name: String,
    /// Link to the resource
    pub url: String,
    /// Raw category, normalized on conversion
    pub category: Option<String>,
    /// Already comma-joined tags
    pub tags: String,
    /// Free-form notes
    pub notes: String,
}

impl ResourceEntity {
    /// Builds the row for `resource`, deriving keys and timestamps from `now`
    #[must_use]
    pub fn new(resource: NewResource, now: DateTime<Utc>) -> Self {
        let category = normalize_category(resource.category.as_deref());

        Self {
            partition_key: category.clone(),
            row_key: now.format(ROW_KEY_FORMAT).to_string(),
            name: resource.name,
            url: resource.url,
            category,
            tags: resource.tags,
            notes: resource.notes,
            created_at: now.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

/// A resource as read back from the table
///
/// Rows are schemaless, so every attribute may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Partition key
    #[serde(rename = "PartitionKey")]
    pub partition_key: Option<String>,
    /// Row key
    #[serde(rename = "RowKey")]
    pub row_key: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Link to the resource
    pub url: Option<String>,
    /// Category
    pub category: Option<String>,
    /// Comma-joined tags
    pub tags: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// ISO-8601 UTC creation time
    pub created_at: Option<String>,
}

impl ResourceRecord {
    /// Decodes the stored tags
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.as_deref().map(split_tags).unwrap_or_default()
    }
}

impl From<ResourceEntity> for ResourceRecord {
    fn from(entity: ResourceEntity) -> Self {
        Self {
            partition_key: Some(entity.partition_key),
            row_key: Some(entity.row_key),
            name: Some(entity.name),
            url: Some(entity.url),
            category: Some(entity.category),
            tags: Some(entity.tags),
            notes: Some(entity.notes),
            created_at: Some(entity.created_at),
        }
    }
}

/// Trims and lowercases a category, falling back to [`DEFAULT_CATEGORY`]
#[must_use]
pub fn normalize_category(category: Option<&str>) -> String {
    let category = category.unwrap_or_default().trim().to_lowercase();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category
    }
}

/// Joins tags with commas, skipping empty ones and trimming the rest
///
/// A whitespace-only tag leaves an empty slot, which [`split_tags`] drops.
pub fn join_tags<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            (!tag.is_empty()).then(|| tag.trim().to_string())
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits stored tags on commas, dropping blank fragments
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|tag| !tag.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Table operations the HTTP layer depends on
#[async_trait]
pub trait ResourceTable: Send + Sync {
    /// Creates the table if it does not exist yet
    async fn ensure_table(&self) -> ResourceStorageResult<()>;

    /// Inserts a new row, failing if the key is already taken
    async fn insert(&self, entity: &ResourceEntity) -> ResourceStorageResult<()>;

    /// Returns every row in the table, in storage order
    async fn list(&self) -> ResourceStorageResult<Vec<ResourceRecord>>;
}

/// Storage client for the resources table
pub struct ResourceStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    provisioned: OnceCell<()>,
}

impl ResourceStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for resources
    #[must_use]
    pub fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
            provisioned: OnceCell::new(),
        }
    }

    /// Name of the backing table
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Creates the table, treating "already exists" as success
    async fn create_table_if_absent(&self) -> ResourceStorageResult<()> {
        let result = self
            .dynamodb_client
            .create_table()
            .table_name(&self.table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(ResourceAttribute::PartitionKey.to_string())
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(ResourceAttribute::RowKey.to_string())
                    .key_type(KeyType::Range)
                    .build()?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(ResourceAttribute::PartitionKey.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(ResourceAttribute::RowKey.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(table = %self.table_name, "Created table");
                self.wait_until_active().await
            }
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_resource_in_use_exception() => {
                debug!(table = %self.table_name, "Table already exists");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn wait_until_active(&self) -> ResourceStorageResult<()> {
        self.dynamodb_client
            .wait_until_table_exists()
            .table_name(&self.table_name)
            .wait(TABLE_ACTIVE_TIMEOUT)
            .await
            .map_err(|err| {
                ResourceStorageError::TableNotReady(DisplayErrorContext(&err).to_string())
            })?;

        Ok(())
    }
}

#[async_trait]
impl ResourceTable for ResourceStorage {
    async fn ensure_table(&self) -> ResourceStorageResult<()> {
        self.provisioned
            .get_or_try_init(|| self.create_table_if_absent())
            .await?;

        Ok(())
    }

    async fn insert(&self, entity: &ResourceEntity) -> ResourceStorageResult<()> {
        let item = to_item(entity)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ResourceAttribute::PartitionKey.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    ResourceStorageError::EntityExists {
                        partition_key: entity.partition_key.clone(),
                        row_key: entity.row_key.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        info!(
            table = %self.table_name,
            row_key = %entity.row_key,
            "Created resource entity"
        );

        Ok(())
    }

    async fn list(&self) -> ResourceStorageResult<Vec<ResourceRecord>> {
        let mut items = self
            .dynamodb_client
            .scan()
            .table_name(&self.table_name)
            .into_paginator()
            .items()
            .send();

        let mut records: Vec<ResourceRecord> = Vec::new();
        while let Some(item) = items.next().await {
            records.push(from_item(item?)?);
        }

        debug!(table = %self.table_name, count = records.len(), "Scanned resources");

        Ok(records)
    }
}
