use crate::error::{HiveProbeError, UserFriendlyError};
use crate::search::{RoleSearch, SearchResult};
use crate::server::AppState;
use crate::staging::StagedFileSet;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const UPLOAD_FIELD: &str = "files";

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>HiveProbe</title></head>
<body>
<h1>HiveProbe</h1>
<p>Upload two or three registry hive exports (SAM, SYSTEM, SECURITY) in any order.</p>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="files" multiple>
<button type="submit">Probe</button>
</form>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut uploads = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(e.status(), e.body_text()),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => uploads.push((filename, bytes.to_vec())),
            Err(e) => return error_response(e.status(), e.body_text()),
        }
    }

    info!(files = uploads.len(), "received upload");

    let base = state.config.staging.base_directory.clone();
    let invoker = state.invoker.clone();
    let stop_on_missing_tool = state.config.search.stop_on_missing_tool;

    let outcome = task::spawn_blocking(move || -> Result<SearchResult, HiveProbeError> {
        let staged = StagedFileSet::from_uploads(uploads, base.as_deref())?;
        let result = RoleSearch::new(invoker)
            .with_stop_on_missing_tool(stop_on_missing_tool)
            .search(staged.file_set());

        if let Err(e) = staged.close() {
            warn!(error = %e, "failed to remove staging directory");
        }
        Ok(result)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Json(result).into_response(),
        Ok(Err(e)) if e.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, e.user_message())
        }
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Search task failed: {}", e),
        ),
    }
}
