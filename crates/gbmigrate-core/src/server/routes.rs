use crate::server::handlers::{convert, files};
use crate::server::ServerState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Largest accepted upload body
pub const UPLOAD_LIMIT: usize = 64 * 1024 * 1024;

/// Create the application router
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/convert", post(convert::convert_file))
        .route("/files", get(files::list_files))
        .route(
            "/upload",
            post(files::upload_file).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/download/:filename", get(files::download_file))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let state = Arc::new(ServerState::new(&AppConfig::default()));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let state = Arc::new(ServerState::new(&AppConfig::default()));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
