use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{parse_object_id, StoreError};
use crate::entities::videos::{strip_falsy_thumbnail, Candidate, VideoDraft, VideoObject};
use crate::errors::AppError;
use crate::streaming::TextStream;
use crate::InnerState;

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

fn parse_candidate(body: &Bytes) -> Result<Candidate, PayloadError> {
    match serde_json::from_slice::<serde_json::Value>(body)? {
        serde_json::Value::Object(candidate) => Ok(candidate),
        _ => Err(PayloadError::NotAnObject),
    }
}

#[tracing::instrument(name = "List videos", skip(inner))]
pub async fn all_videos(State(inner): State<InnerState>) -> Result<Response, AppError> {
    let InnerState { store } = inner;

    let videos = store.find_all().await?;

    if videos.is_empty() {
        return Ok((StatusCode::OK, "No Videos").into_response());
    }

    tracing::debug!("Fetched {} videos", videos.len());

    let videos: Vec<VideoObject> = videos.into_iter().map(VideoObject::from).collect();
    Ok((StatusCode::OK, Json(videos)).into_response())
}

#[tracing::instrument(name = "Create video", skip(inner, body))]
pub async fn create_video(
    State(inner): State<InnerState>,
    body: Bytes,
) -> Result<(StatusCode, Json<VideoObject>), AppError> {
    let InnerState { store } = inner;

    let mut candidate = parse_candidate(&body).map_err(AppError::unhandled)?;
    strip_falsy_thumbnail(&mut candidate);

    let draft = VideoDraft::from_candidate(&candidate).map_err(StoreError::from)?;
    let video = store.create(draft).await?;

    tracing::debug!("Created video {}", video.id);

    Ok((StatusCode::CREATED, Json(VideoObject::from(video))))
}

// Lookup faults are left to the error page, unlike the guarded handlers.
#[tracing::instrument(name = "Get video", skip(inner))]
pub async fn get_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<VideoObject>, AppError> {
    let InnerState { store } = inner;

    let id = parse_object_id(&id).ok_or(AppError::InvalidId)?;

    let video = store
        .find_by_id(id)
        .await
        .map_err(AppError::unhandled)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(VideoObject::from(video)))
}

#[tracing::instrument(name = "Stream video description", skip(inner))]
pub async fn stream_description(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<TextStream, AppError> {
    let InnerState { store } = inner;

    let id = parse_object_id(&id).ok_or(AppError::InvalidId)?;

    let video = store
        .find_by_id(id)
        .await
        .map_err(AppError::unhandled)?
        .ok_or(AppError::NotFound)?;

    tracing::debug!(
        "Streaming {} characters of video {}",
        video.description.chars().count(),
        video.id
    );

    let video_id = video.id;
    Ok(TextStream::new(video.description)
        .on_abort(move || tracing::info!(%video_id, "aborted")))
}

#[tracing::instrument(name = "Update video", skip(inner, body))]
pub async fn update_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<VideoObject>, AppError> {
    let InnerState { store } = inner;

    let id = parse_object_id(&id).ok_or(AppError::InvalidId)?;

    let mut video = store
        .find_by_id(id)
        .await
        .map_err(AppError::unhandled)?
        .ok_or(AppError::NotFound)?;

    let mut candidate = parse_candidate(&body).map_err(AppError::internal)?;
    strip_falsy_thumbnail(&mut candidate);

    video.apply(&candidate).map_err(StoreError::from)?;
    store.save(&video).await?;

    tracing::debug!("Updated video {}", video.id);

    Ok(Json(VideoObject::from(video)))
}

#[tracing::instrument(name = "Delete video", skip(inner))]
pub async fn delete_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    let InnerState { store } = inner;

    let id = parse_object_id(&id).ok_or(AppError::InvalidId)?;

    if !store.delete_by_id(id).await? {
        return Err(AppError::NotFound);
    }

    tracing::debug!("Deleted video {}", id);

    Ok(Json(Message { message: "Deleted" }))
}

#[tracing::instrument(name = "Delete all videos", skip(inner))]
pub async fn delete_all_videos(State(inner): State<InnerState>) -> Result<Json<Message>, AppError> {
    let InnerState { store } = inner;

    store.delete_all().await?;

    Ok(Json(Message {
        message: "All videos deleted",
    }))
}
