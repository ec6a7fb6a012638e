//! UI routes: embedded HTML page and client script

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

// Embed static files at compile time
const INDEX_HTML: &str = include_str!("../../static/index.html");
const APP_JS: &str = include_str!("../../static/js/app.js");

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_page))
        .route("/static/js/app.js", get(serve_app_js))
}

/// GET /
async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/js/app.js
async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        APP_JS,
    )
        .into_response()
}
