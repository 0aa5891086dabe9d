use axum::http::StatusCode;
use axum::response::IntoResponse;

pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Hello this is a video CRUD app!")
}

pub async fn connection_error(message: String) -> impl IntoResponse {
    (StatusCode::OK, format!("Connection Error: {}", message))
}
