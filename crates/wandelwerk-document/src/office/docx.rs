// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX reader. Walks `word/document.xml` (WordprocessingML) with a streaming
// `quick-xml` reader and keeps paragraph text, headings, line breaks and
// explicit page breaks. Formatting beyond that is dropped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use wandelwerk_core::error::{Result, WandelwerkError};

use super::{OfficeBlock, OfficeDocument, read_package_entry};

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// Paragraph being assembled.
#[derive(Default)]
struct Paragraph {
    text: String,
    heading: bool,
    break_before: bool,
    /// A page break already split this paragraph.
    split: bool,
}

pub fn parse(bytes: &[u8]) -> Result<OfficeDocument> {
    let xml = read_package_entry(bytes, DOCUMENT_ENTRY)?;
    parse_document_xml(&xml)
}

pub(crate) fn parse_document_xml(xml: &str) -> Result<OfficeDocument> {
    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|err| {
            WandelwerkError::UnsupportedSourceFormat(format!(
                "{DOCUMENT_ENTRY} at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(Paragraph::default()),
                b"w:t" => in_text = true,
                _ => on_element(&e, &mut paragraph, &mut blocks)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                // A self-closing paragraph is an empty line.
                b"w:p" => blocks.push(OfficeBlock::Paragraph {
                    text: String::new(),
                    heading: false,
                }),
                _ => on_element(&e, &mut paragraph, &mut blocks)?,
            },
            Event::Text(t) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    let text = t.unescape().map_err(|err| {
                        WandelwerkError::UnsupportedSourceFormat(format!("bad text escape: {err}"))
                    })?;
                    p.text.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        finish_paragraph(p, &mut blocks);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(OfficeDocument { blocks })
}

fn on_element(
    e: &BytesStart<'_>,
    paragraph: &mut Option<Paragraph>,
    blocks: &mut Vec<OfficeBlock>,
) -> Result<()> {
    let Some(p) = paragraph.as_mut() else {
        return Ok(());
    };
    match e.name().as_ref() {
        b"w:pStyle" => {
            if let Some(style) = attribute(e, "w:val")? {
                p.heading = is_heading_style(&style);
            }
        }
        b"w:pageBreakBefore" => {
            p.break_before = !matches!(
                attribute(e, "w:val")?.as_deref(),
                Some("false" | "0" | "off")
            );
        }
        b"w:br" => {
            if attribute(e, "w:type")?.as_deref() == Some("page") {
                split_at_page_break(p, blocks);
            } else {
                p.text.push('\n');
            }
        }
        b"w:cr" => p.text.push('\n'),
        // `w:tab` with a `w:val` is a tab stop definition, not a tab character.
        b"w:tab" => {
            if attribute(e, "w:val")?.is_none() {
                p.text.push(' ');
            }
        }
        _ => {}
    }
    Ok(())
}

/// Close the text so far and start a new page inside the same paragraph.
fn split_at_page_break(p: &mut Paragraph, blocks: &mut Vec<OfficeBlock>) {
    if p.break_before {
        blocks.push(OfficeBlock::PageBreak);
        p.break_before = false;
    }
    if !p.text.is_empty() {
        blocks.push(OfficeBlock::Paragraph {
            text: std::mem::take(&mut p.text),
            heading: p.heading,
        });
    }
    blocks.push(OfficeBlock::PageBreak);
    p.split = true;
}

fn finish_paragraph(p: Paragraph, blocks: &mut Vec<OfficeBlock>) {
    if p.break_before {
        blocks.push(OfficeBlock::PageBreak);
    }
    if p.split && p.text.is_empty() {
        return;
    }
    blocks.push(OfficeBlock::Paragraph {
        text: p.text,
        heading: p.heading,
    });
}

fn is_heading_style(style: &str) -> bool {
    let lower = style.to_ascii_lowercase();
    lower == "title" || lower.starts_with("heading")
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attr = e.try_get_attribute(name).map_err(|err| {
        WandelwerkError::UnsupportedSourceFormat(format!("bad attribute {name}: {err}"))
    })?;
    attr.map(|a| {
        a.unescape_value()
            .map(|value| value.into_owned())
            .map_err(|err| {
                WandelwerkError::UnsupportedSourceFormat(format!("bad attribute {name}: {err}"))
            })
    })
    .transpose()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::office::test_support::package;

    /// Wrap body XML in a minimal WordprocessingML document.
    pub fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }

    pub fn docx(body: &str) -> Vec<u8> {
        package(&[
            ("[Content_Types].xml", "<Types/>"),
            (DOCUMENT_ENTRY, &document_xml(body)),
        ])
    }

    fn para(text: &str) -> OfficeBlock {
        OfficeBlock::Paragraph {
            text: text.into(),
            heading: false,
        }
    }

    #[test]
    fn paragraphs_and_runs_are_joined() {
        let doc = parse(&docx(
            r#"<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t xml:space="preserve">world &amp; co</w:t></w:r></w:p>
               <w:p><w:r><w:t>Second</w:t><w:tab/><w:t>column</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.blocks, vec![para("Hello world & co"), para("Second column")]);
    }

    #[test]
    fn page_break_runs_split_pages() {
        let doc = parse(&docx(
            r#"<w:p><w:r><w:t>one</w:t></w:r></w:p>
               <w:p><w:r><w:br w:type="page"/></w:r></w:p>
               <w:p><w:r><w:t>two</w:t><w:br w:type="page"/><w:t>three</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(
            doc.blocks,
            vec![
                para("one"),
                OfficeBlock::PageBreak,
                para("two"),
                OfficeBlock::PageBreak,
                para("three"),
            ]
        );
    }

    #[test]
    fn page_break_before_property() {
        let doc = parse(&docx(
            r#"<w:p><w:r><w:t>intro</w:t></w:r></w:p>
               <w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>chapter</w:t></w:r></w:p>
               <w:p><w:pPr><w:pageBreakBefore w:val="false"/></w:pPr><w:r><w:t>same page</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.page_breaks(), 1);
        assert_eq!(doc.blocks[1], OfficeBlock::PageBreak);
    }

    #[test]
    fn heading_styles_are_flagged() {
        let doc = parse(&docx(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Book</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:t>text</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        let headings: Vec<bool> = doc
            .blocks
            .iter()
            .map(|b| matches!(b, OfficeBlock::Paragraph { heading: true, .. }))
            .collect();
        assert_eq!(headings, vec![true, true, false]);
    }

    #[test]
    fn soft_breaks_and_empty_paragraphs() {
        let doc = parse(&docx(
            r#"<w:p><w:r><w:t>line</w:t><w:br/><w:t>next</w:t></w:r></w:p><w:p/><w:p></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.blocks, vec![para("line\nnext"), para(""), para("")]);
    }

    #[test]
    fn malformed_xml_is_unsupported() {
        let err = parse_document_xml("<w:document><w:body><w:p></w:body>").unwrap_err();
        assert!(matches!(err, WandelwerkError::UnsupportedSourceFormat(_)));
    }
}
