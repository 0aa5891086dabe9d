mod root;
mod videos;


pub use root::*;
pub use videos::*;

use axum::http::{HeaderName, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::db::StoreError;
use crate::errors::handle_panic;
use crate::{logging, InnerState};

/// Creates the router served once the document store is connected.
#[tracing::instrument(name = "create_video_router", skip(state))]
pub fn create_video_router(state: InnerState) -> Router {
    tracing::info!("Setting up video routes");

    let router = Router::new()
        .route("/", get(root))
        .route("/videos", get(all_videos))
        .route("/videos/clear", delete(delete_all_videos))
        .route("/video", post(create_video))
        .route(
            "/video/:id",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/video/d/:id", get(stream_description))
        .with_state(state);

    with_layers(router)
}

/// Creates the router served when connecting to the document store failed.
/// Only the root route answers normally; everything else reports the
/// connection error.
#[tracing::instrument(name = "create_unavailable_router", skip(error))]
pub fn create_unavailable_router(error: &StoreError) -> Router {
    tracing::warn!("Video routes disabled, document store unavailable");

    let message = error.to_string();
    let router = Router::new()
        .route("/", get(root))
        .fallback(move || connection_error(message.clone()));

    with_layers(router)
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static("axum"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(logging::make_span)
                .on_request(logging::on_request)
                .on_response(logging::on_response)
                .on_failure(logging::on_failure),
        )
}
