// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open an existing PDF with `lopdf` and recover its text, page by
// page, in content-stream order.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::ExtractedDocument;
use wandelwerk_core::error::{Result, WandelwerkError};

use super::encoding;

/// A `TJ` adjustment (thousandths of an em, negative widens) past this
/// magnitude is treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 250.0;

/// Byte order mark that introduces a UTF-16BE text string.
const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document`. Text is taken from the text-showing operators of
/// each page's content stream without any geometric reordering.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            WandelwerkError::MalformedDocument(format!("failed to load PDF from memory: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Text of every page, in page-tree order.
    #[instrument(skip(self))]
    pub fn extract_text(&self) -> Result<ExtractedDocument> {
        let pages = self.document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for (number, page_id) in pages {
            texts.push(self.page_text(number, page_id)?);
        }

        let extracted = ExtractedDocument::from_pages(texts);
        info!(
            pages = extracted.page_count(),
            chars = extracted.full_text.len(),
            "Text extracted"
        );
        Ok(extracted)
    }

    fn page_text(&self, number: u32, page_id: ObjectId) -> Result<String> {
        let raw = self.document.get_page_content(page_id).map_err(|err| {
            WandelwerkError::MalformedDocument(format!("cannot read content of page {number}: {err}"))
        })?;
        let content = Content::decode(&raw).map_err(|err| {
            WandelwerkError::MalformedDocument(format!(
                "cannot decode content stream of page {number}: {err}"
            ))
        })?;

        let encodings = self.page_encodings(number, page_id);
        let mut decoder = RunDecoder {
            encodings: &encodings,
            current: None,
        };
        let mut runs: Vec<String> = Vec::new();
        for op in &content.operations {
            let run = match op.operator.as_str() {
                "Tf" => {
                    decoder.select(op.operands.first());
                    None
                }
                "Tj" | "'" => op.operands.first().and_then(|o| decoder.string_run(o)),
                "\"" => op.operands.get(2).and_then(|o| decoder.string_run(o)),
                "TJ" => op.operands.first().and_then(|o| decoder.array_run(o)),
                _ => None,
            };
            if let Some(run) = run.filter(|run| !run.trim().is_empty()) {
                runs.push(run);
            }
        }

        debug!(page = number, runs = runs.len(), "Page text collected");
        Ok(runs.join(" "))
    }

    /// Encoding of every font in the page's resources, by resource name.
    fn page_encodings(&self, number: u32, page_id: ObjectId) -> BTreeMap<Vec<u8>, Encoding<'_>> {
        let fonts = match self.document.get_page_fonts(page_id) {
            Ok(fonts) => fonts,
            Err(err) => {
                warn!(page = number, error = %err, "Cannot read page fonts");
                return BTreeMap::new();
            }
        };
        fonts
            .into_iter()
            .filter_map(|(name, font)| match font.get_font_encoding(&self.document) {
                Ok(encoding) => Some((name, encoding)),
                Err(err) => {
                    debug!(page = number, error = %err, "Font encoding unavailable");
                    None
                }
            })
            .collect()
    }
}

/// Decodes string operands with the encoding of the font selected by `Tf`.
struct RunDecoder<'a, 'doc> {
    encodings: &'a BTreeMap<Vec<u8>, Encoding<'doc>>,
    current: Option<&'a Encoding<'doc>>,
}

impl RunDecoder<'_, '_> {
    fn select(&mut self, font: Option<&Object>) {
        self.current = font
            .and_then(|name| name.as_name().ok())
            .and_then(|name| self.encodings.get(name));
    }

    fn string_run(&self, operand: &Object) -> Option<String> {
        let Object::String(bytes, _) = operand else {
            return None;
        };
        if bytes.starts_with(&UTF16_BOM) {
            return lopdf::decode_text_string(operand).ok();
        }
        let decoded = self
            .current
            .and_then(|encoding| Document::decode_text(encoding, bytes).ok());
        Some(decoded.unwrap_or_else(|| encoding::decode(bytes)))
    }

    fn array_run(&self, operand: &Object) -> Option<String> {
        let Object::Array(items) = operand else {
            return None;
        };
        let mut run = String::new();
        for item in items {
            match item {
                Object::String(..) => {
                    if let Some(text) = self.string_run(item) {
                        run.push_str(&text);
                    }
                }
                Object::Integer(adjust) => push_gap(&mut run, *adjust as f32),
                Object::Real(adjust) => push_gap(&mut run, *adjust),
                _ => {}
            }
        }
        Some(run)
    }
}

fn push_gap(run: &mut String, adjust: f32) {
    if -adjust > TJ_SPACE_THRESHOLD && !run.is_empty() && !run.ends_with(' ') {
        run.push(' ');
    }
}
