// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wandelwerk-document — The converters behind the Wandelwerk file conversion
// service.
//
// Provides raster image re-encoding, office-document (DOCX, ODT, plain text)
// and image to PDF conversion, PDF text extraction, and reconstruction of an
// edited text (plus optional image) as a fresh PDF.

pub mod convert;
pub mod image;
pub mod office;
pub mod pdf;

// Re-export the primary structs so callers can use `wandelwerk_document::PdfReader` etc.
pub use convert::DocumentConverter;
pub use image::converter::ImageConverter;
pub use office::OfficeDocument;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
