// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-to-PDF conversion.
//
// Office documents (DOCX, ODT, plain text) are parsed into paragraphs and page
// breaks and then laid out with the shared layout engine. Raster images become
// a single-page PDF. The source kind comes from the original file name's
// extension.

use tracing::{info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{Alignment, FontFamily, OfficeFormat, PageSize, SourceKind};

use crate::office::OfficeDocument;
use crate::pdf::{LayoutEngine, PdfWriter};

/// Body font for converted documents.
pub const BODY_FONT: FontFamily = FontFamily::Helvetica;

/// Gap between office paragraphs, in lines.
const OFFICE_PARAGRAPH_SPACING: f32 = 0.5;

/// Converts office documents and images to PDF.
pub struct DocumentConverter;

impl DocumentConverter {
    /// Convert `bytes` to a PDF at `page_size`.
    ///
    /// `original_name` is the uploaded file name; only its extension is used.
    #[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
    pub fn convert_to_pdf(bytes: &[u8], original_name: &str, page_size: PageSize) -> Result<Vec<u8>> {
        match SourceKind::from_file_name(original_name) {
            SourceKind::Office(format) => Self::office_to_pdf(bytes, format, page_size),
            SourceKind::Image => {
                info!(paper = ?page_size, "Converting image to PDF");
                PdfWriter::new(page_size).create_from_image(bytes)
            }
            SourceKind::Unknown => Err(WandelwerkError::UnsupportedSourceFormat(format!(
                "cannot convert '{original_name}' to PDF"
            ))),
        }
    }

    /// Parse an office document and lay it out at `page_size`.
    pub fn office_to_pdf(bytes: &[u8], format: OfficeFormat, page_size: PageSize) -> Result<Vec<u8>> {
        let document = OfficeDocument::parse(bytes, format)?;
        let blocks = document.to_blocks(BODY_FONT);
        info!(
            ?format,
            blocks = blocks.len(),
            page_breaks = document.page_breaks(),
            "Converting office document to PDF"
        );

        let engine = LayoutEngine::new(page_size, Alignment::Left)
            .with_paragraph_spacing(OFFICE_PARAGRAPH_SPACING);
        Ok(PdfWriter::new(page_size).create_from_blocks(&engine, &blocks))
    }
}
