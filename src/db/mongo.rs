use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Collection, Database};

use super::{StoreError, VideoStore};
use crate::config::Settings;
use crate::entities::videos::{Video, VideoDraft};

const COLLECTION: &str = "videos";
const FALLBACK_DATABASE: &str = "test";

#[derive(Clone, Debug)]
pub struct MongoVideoStore {
    database: Database,
}

impl MongoVideoStore {
    fn collection(&self) -> Collection<Video> {
        self.database.collection(COLLECTION)
    }
}

/// Connects to the configured MongoDB deployment and pings it. Fails if the
/// ping does not succeed within the configured timeout.
#[tracing::instrument(name = "connect_document_store", skip(settings))]
pub async fn connect(settings: &Settings) -> Result<MongoVideoStore, StoreError> {
    let timeout = settings.connect_timeout;
    tracing::debug!("setting up mongo client");

    let connecting = async {
        let mut options = ClientOptions::parse(&settings.mongodb_uri).await?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);

        let client = mongodb::Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE));

        database.run_command(doc! { "ping": 1 }, None).await?;

        Ok::<_, mongodb::error::Error>(database)
    };

    let database = tokio::time::timeout(timeout, connecting)
        .await
        .map_err(|_| StoreError::Connection(format!("connection timed out after {:?}", timeout)))?
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    tracing::info!(database = %database.name(), "connected to mongodb");

    Ok(MongoVideoStore { database })
}

#[async_trait]
impl VideoStore for MongoVideoStore {
    async fn find_all(&self) -> Result<Vec<Video>, StoreError> {
        let videos = self
            .collection()
            .find(None, None)
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        Ok(videos)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Video>, StoreError> {
        let video = self.collection().find_one(doc! { "_id": id }, None).await?;

        Ok(video)
    }

    async fn create(&self, draft: VideoDraft) -> Result<Video, StoreError> {
        let video = draft.into_video(ObjectId::new());

        self.collection().insert_one(&video, None).await?;

        Ok(video)
    }

    async fn save(&self, video: &Video) -> Result<(), StoreError> {
        let result = self
            .collection()
            .replace_one(doc! { "_id": video.id }, video, None)
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::DocumentNotFound(video.id));
        }

        tracing::debug!("Saved video {}", video.id);

        Ok(())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, StoreError> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": id }, None)
            .await?;

        Ok(result.deleted_count == 1)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let result = self.collection().delete_many(doc! {}, None).await?;

        tracing::info!("Deleted {} videos", result.deleted_count);

        Ok(())
    }
}
