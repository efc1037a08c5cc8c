use axum::{http::StatusCode, Extension, Json};
use chrono::Utc;
use resource_storage::resource::{join_tags, NewResource, ResourceEntity, ResourceRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use validator::Validate;

use crate::{
    state::AppState,
    types::{AppError, ValidatedJson},
};

/// Request body for submitting a resource
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateResourceRequest {
    /// Display name
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    /// Link to the resource
    #[validate(required, length(min = 1))]
    pub url: Option<String>,
    /// Category, trimmed and lowercased; `general` when blank
    pub category: Option<String>,
    /// A list of tags, or any other value stored as text
    pub tags: Option<Value>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl CreateResourceRequest {
    fn into_new_resource(self) -> NewResource {
        NewResource {
            name: self.name.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            category: self.category,
            tags: self.tags.map(encode_tags).unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// Response for a created resource
#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateResourceResponse {
    ok: bool,
    /// The stored row
    pub resource: ResourceEntity,
}

/// A resource as listed by the API
#[derive(Debug, Serialize, JsonSchema)]
pub struct ResourceView {
    /// Category partition the row lives in
    pub partition: Option<String>,
    /// Row key
    pub id: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Link to the resource
    pub url: Option<String>,
    /// Normalized category
    pub category: Option<String>,
    /// Decoded tags, blank ones dropped
    pub tags: Vec<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// ISO-8601 UTC creation time
    pub created_at: Option<String>,
}

impl From<ResourceRecord> for ResourceView {
    fn from(record: ResourceRecord) -> Self {
        let tags = record.tag_list();

        Self {
            partition: record.partition_key,
            id: record.row_key,
            name: record.name,
            url: record.url,
            category: record.category,
            tags,
            notes: record.notes,
            created_at: record.created_at,
        }
    }
}

/// Response listing every resource
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListResourcesResponse {
    ok: bool,
    /// Every stored resource, newest first
    pub resources: Vec<ResourceView>,
}

/// Submit a resource
///
/// Creates the table on first use and inserts one row keyed by the
/// normalized category and the creation time.
///
/// # Errors
///
/// - 400 when the body is not a JSON object or lacks `name` or `url`
/// - 500 when storage is not configured, the table cannot be created, or the
///   row key is already taken
#[instrument(skip_all)]
pub async fn create_resource(
    Extension(state): Extension<AppState>,
    ValidatedJson(request): ValidatedJson<CreateResourceRequest>,
) -> Result<(StatusCode, Json<CreateResourceResponse>), AppError> {
    let table = state.resources()?;
    let resource = ResourceEntity::new(request.into_new_resource(), Utc::now());

    table.ensure_table().await?;
    table.insert(&resource).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResourceResponse { ok: true, resource }),
    ))
}

/// List resources
///
/// Returns every row across all categories, newest first.
///
/// # Errors
///
/// 500 when storage is not configured or the table cannot be read.
#[instrument(skip_all)]
pub async fn list_resources(
    Extension(state): Extension<AppState>,
) -> Result<Json<ListResourcesResponse>, AppError> {
    let table = state.resources()?;

    table.ensure_table().await?;
    let mut resources: Vec<ResourceView> = table
        .list()
        .await?
        .into_iter()
        .map(ResourceView::from)
        .collect();

    // Stable, so rows with equal timestamps keep scan order
    resources.sort_by(|a, b| {
        let a = a.created_at.as_deref().unwrap_or_default();
        let b = b.created_at.as_deref().unwrap_or_default();
        b.cmp(a)
    });

    Ok(Json(ListResourcesResponse {
        ok: true,
        resources,
    }))
}

/// Stored form of the `tags` field
///
/// Arrays are comma-joined after dropping falsy elements; any other non-empty
/// value is kept as text.
fn encode_tags(tags: Value) -> String {
    match tags {
        Value::Array(items) => join_tags(
            items
                .into_iter()
                .filter(is_truthy)
                .map(|item| match item {
                    Value::String(tag) => tag,
                    other => other.to_string(),
                }),
        ),
        Value::String(text) => text,
        other if is_truthy(&other) => other.to_string(),
        _ => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
