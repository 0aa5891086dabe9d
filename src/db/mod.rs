//! Document store access for video records.

mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::connect;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::entities::videos::{ValidationError, Video, VideoDraft};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Connection(String),

    #[error("No document found for query \"{{ _id: '{0}' }}\" on model \"Video\"")]
    DocumentNotFound(ObjectId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Record operations the HTTP layer needs from the document store.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Every record, in store order.
    async fn find_all(&self) -> Result<Vec<Video>, StoreError>;

    /// `Ok(None)` when no record has this id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Video>, StoreError>;

    /// Persists a new record and returns it with its generated id.
    async fn create(&self, draft: VideoDraft) -> Result<Video, StoreError>;

    /// Persists a mutated record. Fails with `DocumentNotFound` when the
    /// record is no longer stored.
    async fn save(&self, video: &Video) -> Result<(), StoreError>;

    /// Whether a record was deleted.
    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

/// Parses a path id in either ObjectId form: 24 hex characters, or exactly
/// 12 bytes taken as the raw id. The 12 is a byte count, so a shorter id
/// with multi-byte characters can still qualify.
pub fn parse_object_id(raw: &str) -> Option<ObjectId> {
    if raw.len() == 24 {
        return ObjectId::parse_str(raw).ok();
    }

    let bytes: [u8; 12] = raw.as_bytes().try_into().ok()?;
    Some(ObjectId::from_bytes(bytes))
}
