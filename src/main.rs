mod config;
mod db;
mod entities;
mod errors;
mod logging;
mod routes;
mod streaming;

use anyhow::Context;
use std::sync::Arc;

use crate::config::Settings;
use crate::db::VideoStore;
use crate::routes::{create_unavailable_router, create_video_router};

#[derive(Clone)]
pub struct InnerState {
    pub store: Arc<dyn VideoStore>,
}

impl InnerState {
    pub fn new(store: impl VideoStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    logging::init();

    let settings = Settings::from_env()?;

    let app = match db::connect(&settings).await {
        Ok(store) => create_video_router(InnerState::new(store)),
        Err(err) => {
            tracing::error!(error = %err, "Could not connect to the document store");
            create_unavailable_router(&err)
        }
    };

    let listener = tokio::net::TcpListener::bind(settings.bind_address)
        .await
        .with_context(|| format!("Could not bind to {}", settings.bind_address))?;

    tracing::debug!(
        "listening on {}",
        listener
            .local_addr()
            .context("Could not convert listener address to local address")?
    );

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
