//! Error types for resource table operations

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::{
    create_table::CreateTableError, put_item::PutItemError, scan::ScanError,
};
use thiserror::Error;

/// Result type for resource table operations
pub type ResourceStorageResult<T> = Result<T, ResourceStorageError>;

/// Errors that can occur during resource table operations
#[derive(Error, Debug)]
pub enum ResourceStorageError {
    /// Failed to create the resources table
    #[error("Failed to create table in DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbCreateTableError(#[from] SdkError<CreateTableError>),

    /// Table was created but never became active
    #[error("Table did not become active: {0}")]
    TableNotReady(String),

    /// Failed to insert a resource into `DynamoDB`
    #[error("Failed to insert resource into DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to scan resources from `DynamoDB`
    #[error("Failed to scan resources from DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// A row with the same partition and row key already exists
    #[error("The specified entity already exists: PartitionKey={partition_key}, RowKey={row_key}")]
    EntityExists {
        /// Partition key of the rejected row
        partition_key: String,
        /// Row key of the rejected row
        row_key: String,
    },

    /// Table request could not be built
    #[error("Invalid table request: {0}")]
    BuildError(#[from] BuildError),

    /// The table could not be reached
    #[error("Table unavailable: {0}")]
    Unavailable(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for ResourceStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
