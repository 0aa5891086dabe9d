//! In-process store doubles used by the router tests.

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{StoreError, VideoStore};
use crate::entities::videos::{Video, VideoDraft};

/// Keeps records in insertion order.
#[derive(Default)]
pub struct MemoryVideoStore {
    videos: RwLock<Vec<Video>>,
}

impl MemoryVideoStore {
    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn find_all(&self) -> Result<Vec<Video>, StoreError> {
        Ok(self.videos.read().await.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Video>, StoreError> {
        Ok(self.videos.read().await.iter().find(|v| v.id == id).cloned())
    }

    async fn create(&self, draft: VideoDraft) -> Result<Video, StoreError> {
        let video = draft.into_video(ObjectId::new());
        self.videos.write().await.push(video.clone());
        Ok(video)
    }

    async fn save(&self, video: &Video) -> Result<(), StoreError> {
        let mut videos = self.videos.write().await;
        let stored = videos
            .iter_mut()
            .find(|v| v.id == video.id)
            .ok_or(StoreError::DocumentNotFound(video.id))?;
        *stored = video.clone();
        Ok(())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut videos = self.videos.write().await;
        let before = videos.len();
        videos.retain(|v| v.id != id);
        Ok(videos.len() != before)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.videos.write().await.clear();
        Ok(())
    }
}

/// Drops each record right after it has been looked up, as if a concurrent
/// delete landed between a read and the following write.
#[derive(Default)]
pub struct VanishingVideoStore {
    pub inner: MemoryVideoStore,
}

#[async_trait]
impl VideoStore for VanishingVideoStore {
    async fn find_all(&self) -> Result<Vec<Video>, StoreError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Video>, StoreError> {
        let found = self.inner.find_by_id(id).await?;
        if found.is_some() {
            self.inner.delete_by_id(id).await?;
        }
        Ok(found)
    }

    async fn create(&self, draft: VideoDraft) -> Result<Video, StoreError> {
        self.inner.create(draft).await
    }

    async fn save(&self, video: &Video) -> Result<(), StoreError> {
        self.inner.save(video).await
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, StoreError> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.inner.delete_all().await
    }
}

/// Fails every operation with the same message.
pub struct FailingVideoStore {
    pub message: String,
}

impl FailingVideoStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Connection(self.message.clone()))
    }
}

#[async_trait]
impl VideoStore for FailingVideoStore {
    async fn find_all(&self) -> Result<Vec<Video>, StoreError> {
        self.fail()
    }

    async fn find_by_id(&self, _id: ObjectId) -> Result<Option<Video>, StoreError> {
        self.fail()
    }

    async fn create(&self, _draft: VideoDraft) -> Result<Video, StoreError> {
        self.fail()
    }

    async fn save(&self, _video: &Video) -> Result<(), StoreError> {
        self.fail()
    }

    async fn delete_by_id(&self, _id: ObjectId) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> VideoDraft {
        let candidate = json!({
            "title": "A",
            "channelName": "C",
            "description": "D",
        });
        VideoDraft::from_candidate(candidate.as_object().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn save_replaces_the_stored_record() {
        let store = MemoryVideoStore::default();
        let mut video = store.create(draft()).await.unwrap();

        video.watched = true;
        store.save(&video).await.unwrap();

        let stored = store.find_by_id(video.id).await.unwrap().unwrap();
        assert!(stored.watched);
    }

    #[tokio::test]
    async fn save_fails_for_a_record_deleted_after_lookup() {
        let store = MemoryVideoStore::default();
        let created = store.create(draft()).await.unwrap();
        let video = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(store.delete_by_id(video.id).await.unwrap());

        let err = store.save(&video).await.unwrap_err();

        assert!(matches!(err, StoreError::DocumentNotFound(id) if id == video.id));
        assert_eq!(
            err.to_string(),
            format!(
                "No document found for query \"{{ _id: '{}' }}\" on model \"Video\"",
                video.id
            )
        );
        assert_eq!(store.len().await, 0);
    }
}
