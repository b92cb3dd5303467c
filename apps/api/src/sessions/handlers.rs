//! HTTP handlers for the session lifecycle: upload stamps, generate the
//! grid or individual-page PDF, and reset.
//!
//! Generation takes the session lock, snapshots the asset list, and runs
//! layout + rasterization on the blocking pool with owned data. The first
//! failure aborts the whole build; no partial document reaches the caller.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::compose;
use crate::errors::AppError;
use crate::models::asset::StoredAssetMeta;
use crate::render::{assemble, PdfRenderer};
use crate::state::AppState;

const INDIVIDUAL_OUTPUT: &str = "output_individual/stamps_individual_pages.pdf";

/// POST /api/v1/assets
///
/// Multipart form: `session_id`, `width_mm`, `height_mm`, `file`.
/// Creates the session on first upload.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredAssetMeta>), AppError> {
    let mut session_id: Option<String> = None;
    let mut width_mm: Option<f64> = None;
    let mut height_mm: Option<f64> = None;
    let mut content: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("session_id") => session_id = Some(field_text(field).await?),
            Some("width_mm") => width_mm = Some(parse_dimension("width_mm", field).await?),
            Some("height_mm") => height_mm = Some(parse_dimension("height_mm", field).await?),
            Some("file") => {
                content = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("unreadable file field: {e}"))
                })?)
            }
            _ => {} // unknown fields are ignored
        }
    }

    let session_id = require_field(session_id, "session_id")?;
    let width_mm = require_field(width_mm, "width_mm")?;
    let height_mm = require_field(height_mm, "height_mm")?;
    let content = require_field(content, "file")?;
    if content.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let _guard = state.sessions.acquire(&session_id).await;
    let meta = state
        .store
        .put(&session_id, content, width_mm, height_mm)
        .await?;
    info!(
        session_id = %session_id,
        asset_id = %meta.asset_id,
        sequence = meta.sequence,
        width_mm,
        height_mm,
        "stored stamp asset"
    );
    Ok((StatusCode::CREATED, Json(meta)))
}

/// POST /api/v1/sessions/:session_id/documents/grid
///
/// Lays every dimension group out onto fixed-size sheets. All group sheets
/// are persisted to the session's output area; the response body carries
/// the first group's sheet.
pub async fn handle_generate_grid(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let _guard = state.sessions.acquire(&session_id).await;
    let assets = state.store.list_assets(&session_id).await?;

    let sheet = state.config.sheet_config();
    let raster_dpi = state.config.raster_dpi;
    let rendered: Vec<(String, Vec<u8>)> = tokio::task::spawn_blocking(move || {
        let documents = compose::build_grid_documents(&assets, &sheet)?;
        documents
            .iter()
            .map(|grid| {
                let bytes = assemble(&grid.document, &assets, PdfRenderer::new(raster_dpi))?;
                Ok((grid.key.output_filename(), bytes))
            })
            .collect::<Result<Vec<_>, AppError>>()
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("grid build task failed: {e}")))??;

    for (filename, bytes) in &rendered {
        state
            .store
            .write_output(&session_id, &format!("output/{filename}"), bytes)
            .await?;
    }
    info!(session_id = %session_id, documents = rendered.len(), "generated grid sheets");

    let (filename, bytes) = rendered
        .into_iter()
        .next()
        .ok_or(AppError::NoAssets)?;
    Ok(pdf_response(&filename, bytes))
}

/// POST /api/v1/sessions/:session_id/documents/individual
///
/// One page per stamp, each page sized exactly to its stamp.
pub async fn handle_generate_individual(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let _guard = state.sessions.acquire(&session_id).await;
    let assets = state.store.list_assets(&session_id).await?;

    let raster_dpi = state.config.raster_dpi;
    let bytes: Vec<u8> = tokio::task::spawn_blocking(move || {
        let document = compose::build_individual_document(&assets)?;
        assemble(&document, &assets, PdfRenderer::new(raster_dpi))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("individual build task failed: {e}")))??;

    state
        .store
        .write_output(&session_id, INDIVIDUAL_OUTPUT, &bytes)
        .await?;
    info!(session_id = %session_id, "generated individual-page document");

    Ok(pdf_response("stamps_individual_pages.pdf", bytes))
}

/// DELETE /api/v1/sessions/:session_id
///
/// Destroys the session, its assets, and its generated documents.
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _guard = state.sessions.acquire(&session_id).await;
    state.store.clear(&session_id).await?;
    info!(session_id = %session_id, "session reset");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn require_field<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("missing field '{name}'")))
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("unreadable multipart field: {e}")))
}

/// Parses a millimeter dimension field; must be a finite positive number.
async fn parse_dimension(name: &str, field: Field<'_>) -> Result<f64, AppError> {
    let raw = field_text(field).await?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be a number, got '{raw}'")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::Validation(format!(
            "{name} must be positive, got '{raw}'"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Dimension parsing is exercised through the store and compose tests;
    // here we only pin the response helper's headers.
    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response("stamps_40x15.pdf", b"%PDF-".to_vec());
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE.as_str()], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION.as_str()],
            "attachment; filename=\"stamps_40x15.pdf\""
        );
    }
}
