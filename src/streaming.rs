//! Incremental plain-text responses.

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::time::Duration;

/// Pause after each write.
pub const CHUNK_DELAY: Duration = Duration::from_millis(40);

type AbortHook = Box<dyn FnOnce() + Send + 'static>;

/// Writes a text one character at a time, pausing after each write.
///
/// The stream is dropped by the server when the peer goes away. If that
/// happens before the last pause ends, the abort hook runs and nothing else
/// is written.
pub struct TextStream {
    text: String,
    on_abort: Option<AbortHook>,
}

impl TextStream {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            on_abort: None,
        }
    }

    pub fn on_abort(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_abort = Some(Box::new(hook));
        self
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        let TextStream { text, on_abort } = self;

        async_stream::stream! {
            let mut guard = AbortGuard(on_abort);

            for unit in text.chars() {
                yield Ok::<_, Infallible>(Bytes::from(unit.to_string()));
                tokio::time::sleep(CHUNK_DELAY).await;
            }

            guard.disarm();
        }
    }
}

impl IntoResponse for TextStream {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=UTF-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            Body::from_stream(self.into_stream()),
        )
            .into_response()
    }
}

struct AbortGuard(Option<AbortHook>);

impl AbortGuard {
    fn disarm(&mut self) {
        self.0.take();
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            hook();
        }
    }
}
