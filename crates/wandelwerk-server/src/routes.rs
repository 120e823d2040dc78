// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP routes:
// - POST /convert          multipart upload + target format, returns a reference
// - POST /newPdf           edited text (+ optional image) to a new PDF
// - GET  /convert/:file    download an artifact during its retrieval window
// - GET  /extract/:file    text of a stored PDF, page by page
// - GET  /health

use std::str::FromStr;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wandelwerk_core::error::WandelwerkError;
use wandelwerk_core::{
    Alignment, ArtifactId, CompressionLevel, ConversionRequest, EditableText, ExtractedDocument,
    FontFamily, PageSize, ReconstructRequest, SourceArtifact, TargetFormat,
};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Response to both conversion routes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePathResponse {
    pub file_path: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// The `text` field of a `/newPdf` upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextPayload {
    #[serde(default)]
    text_content: String,
    #[serde(default)]
    text_font: Option<String>,
    #[serde(default)]
    text_align: Option<String>,
}

impl TextPayload {
    fn into_editable(self) -> Result<EditableText, WandelwerkError> {
        Ok(EditableText {
            content: self.text_content,
            font_family: parse_optional::<FontFamily>(self.text_font.as_deref())?.unwrap_or_default(),
            alignment: parse_optional::<Alignment>(self.text_align.as_deref())?.unwrap_or_default(),
        })
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.max_upload_bytes();

    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert))
        .route("/convert/:file", get(download))
        .route("/newPdf", post(new_pdf))
        .route("/extract/:file", get(extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn convert(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<FilePathResponse>> {
    let mut source: Option<SourceArtifact> = None;
    let mut target: Option<String> = None;
    let mut compress: Option<String> = None;
    let mut page_size: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "files" => {
                let original_name = field.file_name().unwrap_or("upload").to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                source = Some(SourceArtifact {
                    bytes: bytes.to_vec(),
                    original_name,
                });
            }
            "convertFileType" => target = Some(field.text().await.map_err(multipart_error)?),
            "compress" => compress = Some(field.text().await.map_err(multipart_error)?),
            "pdfFileSize" => page_size = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let source = source.ok_or_else(|| invalid("missing 'files' upload"))?;
    let target = target.ok_or_else(|| invalid("missing 'convertFileType'"))?;
    let request = ConversionRequest {
        source,
        target_format: TargetFormat::from_str(&target)?,
        compression_level: parse_optional::<CompressionLevel>(compress.as_deref())?.unwrap_or_default(),
        page_size: parse_optional::<PageSize>(page_size.as_deref())?,
    };

    let artifact = state.dispatcher.convert(request).await?;
    Ok(Json(FilePathResponse {
        file_path: artifact.reference(),
    }))
}

async fn new_pdf(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<FilePathResponse>> {
    let mut text: Option<EditableText> = None;
    let mut image: Option<Vec<u8>> = None;
    let mut page_size: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "text" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let payload: TextPayload = serde_json::from_str(&raw)
                    .map_err(|err| invalid(&format!("'text' is not valid JSON: {err}")))?;
                text = Some(payload.into_editable()?);
            }
            "image" => {
                // Browsers send the literal string "null" when no file was picked.
                if field.file_name().is_some() {
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if !bytes.is_empty() {
                        image = Some(bytes.to_vec());
                    }
                }
            }
            "pdfFileSize" => page_size = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let request = ReconstructRequest {
        text: text.ok_or_else(|| invalid("missing 'text'"))?,
        image,
        page_size: parse_optional::<PageSize>(page_size.as_deref())?,
    };

    let artifact = state.dispatcher.reconstruct(request).await?;
    Ok(Json(FilePathResponse {
        file_path: artifact.reference(),
    }))
}

async fn download(State(state): State<AppState>, Path(file): Path<String>) -> ApiResult<Response> {
    let id = artifact_id(&file)?;
    let (artifact, bytes) = state.dispatcher.fetch(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, artifact.mime_type),
            (header::CACHE_CONTROL, "no-store".to_owned()),
        ],
        bytes,
    )
        .into_response())
}

async fn extract(State(state): State<AppState>, Path(file): Path<String>) -> ApiResult<Json<ExtractedDocument>> {
    let id = artifact_id(&file)?;
    Ok(Json(state.dispatcher.extract(id).await?))
}

fn artifact_id(file: &str) -> Result<ArtifactId, ApiError> {
    ArtifactId::from_reference(file).ok_or_else(|| ApiError(invalid(&format!("'{file}' is not an artifact reference"))))
}

/// Parse an optional form value; blank counts as absent.
fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, WandelwerkError>
where
    T: FromStr<Err = WandelwerkError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

fn invalid(detail: &str) -> WandelwerkError {
    WandelwerkError::InvalidRequest(detail.to_owned())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(invalid(&format!("malformed upload: {err}")))
}
