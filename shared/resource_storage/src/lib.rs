//! Table storage for the Affordable IT Resources backend
//!
//! Resource records live in a single `DynamoDB` table keyed by category and
//! creation timestamp. The backend only talks to the table through the
//! [`resource::ResourceTable`] trait.

pub mod resource;
