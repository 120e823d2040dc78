// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Office module — read word-processing documents (DOCX, ODT, plain text) into
// a flat sequence of paragraphs and page breaks.

pub mod docx;
pub mod odt;

use std::io::{Cursor, Read};

use tracing::{debug, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{FontFamily, OfficeFormat};
use zip::ZipArchive;

use crate::pdf::layout::Block;

/// Largest uncompressed package entry we are willing to inflate.
pub const MAX_ENTRY_BYTES: u64 = 32 * 1024 * 1024;

/// Form feed, the page separator in plain text.
const FORM_FEED: char = '\u{000C}';

/// One structural element of an office document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficeBlock {
    /// `\n` inside `text` is a hard line break.
    Paragraph { text: String, heading: bool },
    PageBreak,
}

/// A parsed office document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficeDocument {
    pub blocks: Vec<OfficeBlock>,
}

impl OfficeDocument {
    /// Parse `bytes` as the given format.
    #[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
    pub fn parse(bytes: &[u8], format: OfficeFormat) -> Result<Self> {
        let document = match format {
            OfficeFormat::Docx => docx::parse(bytes)?,
            OfficeFormat::Odt => odt::parse(bytes)?,
            OfficeFormat::PlainText => parse_plain_text(bytes),
        };
        debug!(
            blocks = document.blocks.len(),
            page_breaks = document.page_breaks(),
            "Office document parsed"
        );
        Ok(document)
    }

    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, OfficeBlock::PageBreak))
            .count()
    }

    /// Layout blocks with headings in the bold variant of `body_font`.
    pub fn to_blocks(&self, body_font: FontFamily) -> Vec<Block> {
        self.blocks
            .iter()
            .map(|block| match block {
                OfficeBlock::Paragraph { text, heading } => Block::Paragraph {
                    text: text.clone(),
                    font: if *heading { body_font.bold() } else { body_font },
                },
                OfficeBlock::PageBreak => Block::PageBreak,
            })
            .collect()
    }
}

/// Plain text: form feeds separate pages, blank lines separate paragraphs.
fn parse_plain_text(bytes: &[u8]) -> OfficeDocument {
    let text = String::from_utf8_lossy(bytes);
    let mut blocks = Vec::new();

    for (index, page) in text.split(FORM_FEED).enumerate() {
        if index > 0 {
            blocks.push(OfficeBlock::PageBreak);
        }
        let mut current: Vec<String> = Vec::new();
        for line in page.lines() {
            if line.trim().is_empty() {
                flush_plain(&mut blocks, &mut current);
            } else {
                current.push(line.replace('\t', " "));
            }
        }
        flush_plain(&mut blocks, &mut current);
    }

    OfficeDocument { blocks }
}

fn flush_plain(blocks: &mut Vec<OfficeBlock>, current: &mut Vec<String>) {
    if !current.is_empty() {
        blocks.push(OfficeBlock::Paragraph {
            text: current.join("\n"),
            heading: false,
        });
        current.clear();
    }
}

/// Read one UTF-8 entry of a zip package, refusing oversized entries.
pub(crate) fn read_package_entry(bytes: &[u8], entry: &str) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| {
        WandelwerkError::UnsupportedSourceFormat(format!("not a zip package: {err}"))
    })?;
    let file = archive.by_name(entry).map_err(|err| {
        WandelwerkError::UnsupportedSourceFormat(format!("package has no {entry}: {err}"))
    })?;

    if file.size() > MAX_ENTRY_BYTES {
        return Err(WandelwerkError::UnsupportedSourceFormat(format!(
            "{entry} inflates to {} bytes, limit is {MAX_ENTRY_BYTES}",
            file.size()
        )));
    }

    // The declared size can lie; never read past the limit.
    let mut content = Vec::new();
    file.take(MAX_ENTRY_BYTES + 1)
        .read_to_end(&mut content)
        .map_err(|err| {
            WandelwerkError::UnsupportedSourceFormat(format!("failed to inflate {entry}: {err}"))
        })?;
    if content.len() as u64 > MAX_ENTRY_BYTES {
        return Err(WandelwerkError::UnsupportedSourceFormat(format!(
            "{entry} exceeds {MAX_ENTRY_BYTES} bytes"
        )));
    }

    String::from_utf8(content).map_err(|err| {
        WandelwerkError::UnsupportedSourceFormat(format!("{entry} is not UTF-8: {err}"))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Build an in-memory zip package from `(name, content)` pairs.
    pub fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_starts_new_page() {
        let doc = OfficeDocument::parse(
            b"page one\n\x0cpage two\n\npara two\x0cpage three",
            OfficeFormat::PlainText,
        )
        .unwrap();
        assert_eq!(doc.page_breaks(), 2);
        assert_eq!(
            doc.blocks[2],
            OfficeBlock::Paragraph {
                text: "page two".into(),
                heading: false
            }
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let doc = OfficeDocument::parse(b"caf\xFF", OfficeFormat::PlainText).unwrap();
        assert_eq!(
            doc.blocks,
            vec![OfficeBlock::Paragraph {
                text: "caf\u{FFFD}".into(),
                heading: false
            }]
        );
    }

    #[test]
    fn headings_use_bold_face() {
        let doc = OfficeDocument {
            blocks: vec![
                OfficeBlock::Paragraph {
                    text: "Title".into(),
                    heading: true,
                },
                OfficeBlock::Paragraph {
                    text: "Body".into(),
                    heading: false,
                },
            ],
        };
        let blocks = doc.to_blocks(FontFamily::Helvetica);
        assert!(matches!(
            &blocks[0],
            Block::Paragraph { font: FontFamily::HelveticaBold, .. }
        ));
        assert!(matches!(
            &blocks[1],
            Block::Paragraph { font: FontFamily::Helvetica, .. }
        ));
    }

    #[test]
    fn non_zip_bytes_are_unsupported() {
        let err = read_package_entry(b"PK but not really", "content.xml").unwrap_err();
        assert!(matches!(err, WandelwerkError::UnsupportedSourceFormat(_)));
    }

    #[test]
    fn missing_entry_is_unsupported() {
        let bytes = test_support::package(&[("mimetype", "application/zip")]);
        let err = read_package_entry(&bytes, "word/document.xml").unwrap_err();
        assert!(matches!(err, WandelwerkError::UnsupportedSourceFormat(_)));
    }
}
