// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion dispatcher — validates requests, persists inputs, routes work to
// the right converter on the blocking pool under a wall-clock bound, and
// persists outputs for deferred retrieval.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{
    AppConfig, Artifact, ArtifactId, ConversionRequest, ExtractedDocument, ReconstructRequest,
    TargetFormat,
};
use wandelwerk_document::{DocumentConverter, ImageConverter, PdfReader, PdfWriter};

use crate::store::ArtifactStore;

/// Entry point for every conversion. Cheap to clone.
#[derive(Clone)]
pub struct ConversionDispatcher {
    store: ArtifactStore,
    config: Arc<AppConfig>,
}

impl ConversionDispatcher {
    pub fn new(store: ArtifactStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Convert an upload and return a reference to the stored output.
    ///
    /// The input is persisted before conversion starts. On any failure, or if
    /// this future is dropped early, both input and output are purged.
    #[instrument(
        skip(self, request),
        fields(
            source = %request.source.original_name,
            target = request.target_format.name(),
            bytes_len = request.source.bytes.len()
        )
    )]
    pub async fn convert(&self, request: ConversionRequest) -> Result<Artifact> {
        request.validate()?;

        let mut guard = self.store.guard();
        let input = guard
            .put(&request.source.bytes, &request.source.original_name)
            .await?;

        let ConversionRequest {
            source,
            target_format,
            compression_level,
            page_size,
        } = request;

        let (bytes, extension) = match target_format {
            TargetFormat::Image(encoding) => {
                let bytes = run_bounded(
                    "image conversion",
                    self.config.image_timeout(),
                    move || ImageConverter::encode(&source.bytes, encoding, compression_level),
                )
                .await?;
                (bytes, encoding.extension())
            }
            TargetFormat::Pdf => {
                let page_size = page_size.ok_or_else(|| {
                    WandelwerkError::InvalidRequest("target 'pdf' requires a page size".into())
                })?;
                let bytes = run_bounded(
                    "document conversion",
                    self.config.document_timeout(),
                    move || {
                        DocumentConverter::convert_to_pdf(&source.bytes, &source.original_name, page_size)
                    },
                )
                .await?;
                (bytes, "pdf")
            }
            TargetFormat::Document => {
                return Err(WandelwerkError::UnsupportedEncoding(
                    "conversion to office documents is not offered".into(),
                ));
            }
        };

        let output = guard.put(&bytes, &format!("output.{extension}")).await?;
        guard.release_to_cleanup(self.config.cleanup_delay());

        info!(
            input = %input.id,
            output = %output.id,
            input_sha256 = %input.sha256,
            output_bytes = output.size_bytes,
            "Conversion complete"
        );
        self.store.resolve(output.id)
    }

    /// Lay out edited text (and an optional image) as a new stored PDF.
    #[instrument(
        skip(self, request),
        fields(
            text_len = request.text.content.len(),
            with_image = request.image.is_some()
        )
    )]
    pub async fn reconstruct(&self, request: ReconstructRequest) -> Result<Artifact> {
        let page_size = request.page_size.unwrap_or(self.config.default_page_size);
        let ReconstructRequest { text, image, .. } = request;

        let bytes = run_bounded(
            "reconstruction",
            self.config.reconstruct_timeout(),
            move || PdfWriter::new(page_size).reconstruct(&text, image.as_deref()),
        )
        .await?;

        let mut guard = self.store.guard();
        let output = guard.put(&bytes, "reconstructed.pdf").await?;
        guard.release_to_cleanup(self.config.cleanup_delay());

        info!(output = %output.id, output_bytes = output.size_bytes, "Reconstruction complete");
        self.store.resolve(output.id)
    }

    /// Extract the text of a stored PDF.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn extract(&self, id: ArtifactId) -> Result<ExtractedDocument> {
        let (_, bytes) = self.fetch(id).await?;
        run_bounded(
            "text extraction",
            self.config.reconstruct_timeout(),
            move || PdfReader::from_bytes(&bytes)?.extract_text(),
        )
        .await
    }

    /// Read a stored artifact while it is still within its retrieval window.
    pub async fn fetch(&self, id: ArtifactId) -> Result<(Artifact, Vec<u8>)> {
        let artifact = self.store.resolve(id)?;
        match tokio::fs::read(&artifact.storage_path).await {
            Ok(bytes) => Ok((artifact, bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(WandelwerkError::NotFound(id))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Run CPU-bound `work` on the blocking pool, giving up after `limit`.
///
/// A timed-out task is detached, not interrupted; its result is discarded.
pub(crate) async fn run_bounded<T, F>(operation: &'static str, limit: Duration, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(WandelwerkError::ConversionFailed(format!(
            "{operation} task failed: {join_err}"
        ))),
        Err(_) => {
            warn!(operation, limit_secs = limit.as_secs_f64(), "Conversion timed out");
            Err(WandelwerkError::ConversionTimeout { operation, limit })
        }
    }
}
