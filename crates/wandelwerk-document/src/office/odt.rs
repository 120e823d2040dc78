// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ODT reader. Reads `content.xml` of an OpenDocument text package. Paragraphs
// (`text:p`) and headings (`text:h`) become blocks; automatic paragraph styles
// with `fo:break-before="page"` start a new page.

use std::collections::HashSet;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use wandelwerk_core::error::{Result, WandelwerkError};

use super::{OfficeBlock, OfficeDocument, read_package_entry};

const CONTENT_ENTRY: &str = "content.xml";

pub fn parse(bytes: &[u8]) -> Result<OfficeDocument> {
    let xml = read_package_entry(bytes, CONTENT_ENTRY)?;
    parse_content_xml(&xml)
}

pub(crate) fn parse_content_xml(xml: &str) -> Result<OfficeDocument> {
    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();
    let mut page_break_styles: HashSet<String> = HashSet::new();
    // Style currently being declared in office:automatic-styles.
    let mut declaring_style: Option<String> = None;
    // Open top-level paragraph: (text, heading).
    let mut current: Option<(String, bool)> = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|err| {
            WandelwerkError::UnsupportedSourceFormat(format!(
                "{CONTENT_ENTRY} at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                name @ (b"text:p" | b"text:h") => {
                    depth += 1;
                    if depth == 1 {
                        if breaks_before(&e, &page_break_styles)? {
                            blocks.push(OfficeBlock::PageBreak);
                        }
                        current = Some((String::new(), name == b"text:h"));
                    }
                }
                b"style:style" => declaring_style = attribute(&e, "style:name")?,
                _ => on_element(&e, &mut current, &mut declaring_style, &mut page_break_styles)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                name @ (b"text:p" | b"text:h") if depth == 0 => {
                    if breaks_before(&e, &page_break_styles)? {
                        blocks.push(OfficeBlock::PageBreak);
                    }
                    blocks.push(OfficeBlock::Paragraph {
                        text: String::new(),
                        heading: name == b"text:h",
                    });
                }
                _ => on_element(&e, &mut current, &mut declaring_style, &mut page_break_styles)?,
            },
            Event::Text(t) => {
                if let Some((text, _)) = current.as_mut() {
                    let unescaped = t.unescape().map_err(|err| {
                        WandelwerkError::UnsupportedSourceFormat(format!("bad text escape: {err}"))
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"text:p" | b"text:h" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0
                        && let Some((text, heading)) = current.take()
                    {
                        blocks.push(OfficeBlock::Paragraph { text, heading });
                    }
                }
                b"style:style" => declaring_style = None,
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
    current: &mut Option<(String, bool)>,
    declaring_style: &mut Option<String>,
    page_break_styles: &mut HashSet<String>,
) -> Result<()> {
    match e.name().as_ref() {
        b"style:paragraph-properties" => {
            if let Some(style) = declaring_style.as_ref()
                && attribute(e, "fo:break-before")?.as_deref() == Some("page")
            {
                page_break_styles.insert(style.clone());
            }
        }
        b"text:s" => {
            if let Some((text, _)) = current.as_mut() {
                let count = attribute(e, "text:c")?
                    .and_then(|c| c.parse::<usize>().ok())
                    .unwrap_or(1);
                text.extend(std::iter::repeat_n(' ', count));
            }
        }
        b"text:tab" => {
            if let Some((text, _)) = current.as_mut() {
                text.push(' ');
            }
        }
        b"text:line-break" => {
            if let Some((text, _)) = current.as_mut() {
                text.push('\n');
            }
        }
        _ => {}
    }
    Ok(())
}

fn breaks_before(e: &BytesStart<'_>, page_break_styles: &HashSet<String>) -> Result<bool> {
    Ok(attribute(e, "text:style-name")?
        .is_some_and(|style| page_break_styles.contains(&style)))
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
