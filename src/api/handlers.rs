use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use super::{ApiError, AppState};
use crate::output::store::ArtifactId;

/// Served at `/genidcard`.
pub const BANNER: &str = "ID card service is running. \
GET /genidcard/test for a sample card, GET /genidcard/api/create to generate a new one.";

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Plain-text description of the endpoints.
pub async fn banner() -> &'static str {
    BANNER
}

/// Generate a card and return a page displaying it.
pub async fn create(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let id = state.service.generate().await?;
    Ok(Html(result_page("New ID card", id)))
}

/// Generate the fixed sample card and return a page displaying it.
pub async fn sample(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let id = state.service.generate_sample().await?;
    Ok(Html(result_page("Sample ID card", id)))
}

/// Serve `id_card_<id>.png` while it has not expired.
pub async fn artifact(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(id) = ArtifactId::from_file_name(&file) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    match state.service.read(id).await? {
        Some(png) => Ok((
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            png,
        )
            .into_response()),
        None => {
            tracing::debug!(artifact = %id, "artifact not found");
            Ok(StatusCode::NOT_FOUND.into_response())
        }
    }
}

/// HTML page embedding the artifact `id`.
pub fn result_page(title: &str, id: ArtifactId) -> String {
    let file = id.file_name();
    format!(
        "<!DOCTYPE html>\n\
<html>\n\
<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
<body>\n\
<h1>{title}</h1>\n\
<img src=\"/genidcard/{file}\" alt=\"{file}\">\n\
<p><a href=\"/genidcard/{file}\" download>Download</a></p>\n\
</body>\n\
</html>\n"
    )
}
