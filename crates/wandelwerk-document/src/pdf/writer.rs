// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — turn laid-out text (and an optional image) into PDF bytes using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Line breaking and pagination happen beforehand in
// `layout`, so this module only places what it is given.
//
// printpdf writes builtin-font text as UTF-8, which contradicts the
// /WinAnsiEncoding it declares on the font. Lines are therefore encoded here
// and shown with a raw `Tj`; an empty `WriteTextBuiltinFont` still registers
// the font resource for the page.

use image::DynamicImage;
use printpdf::{
    BuiltinFont, DictItem, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    RawImage, RawImageData, RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{Alignment, EditableText, FontFamily, PageSize};

use super::encoding;
use super::layout::{
    Block, FONT_SIZE_PT, IMAGE_DPI, ImagePlacement, Layout, LayoutEngine, PageGeometry,
    paragraphs_from_text,
};

/// Title written to the /Info dictionary.
const DOCUMENT_TITLE: &str = "Wandelwerk Document";

/// Map a font catalogue entry onto printpdf's built-in faces.
pub fn builtin_font(font: FontFamily) -> BuiltinFont {
    match font {
        FontFamily::TimesRoman => BuiltinFont::TimesRoman,
        FontFamily::TimesBold => BuiltinFont::TimesBold,
        FontFamily::TimesItalic => BuiltinFont::TimesItalic,
        FontFamily::TimesBoldItalic => BuiltinFont::TimesBoldItalic,
        FontFamily::Helvetica => BuiltinFont::Helvetica,
        FontFamily::HelveticaBold => BuiltinFont::HelveticaBold,
        FontFamily::HelveticaOblique => BuiltinFont::HelveticaOblique,
        FontFamily::HelveticaBoldOblique => BuiltinFont::HelveticaBoldOblique,
        FontFamily::Courier => BuiltinFont::Courier,
        FontFamily::CourierBold => BuiltinFont::CourierBold,
        FontFamily::CourierOblique => BuiltinFont::CourierOblique,
        FontFamily::CourierBoldOblique => BuiltinFont::CourierBoldOblique,
        FontFamily::Symbol => BuiltinFont::Symbol,
        FontFamily::ZapfDingbats => BuiltinFont::ZapfDingbats,
    }
}

/// An image ready to be placed on the first page.
struct EmbeddedImage {
    raw: RawImage,
    placement: ImagePlacement,
}

/// Creates PDF documents from edited text, office-document blocks, or a
/// single raster image.
pub struct PdfWriter {
    /// Page size for page creation.
    page_size: PageSize,
}

impl PdfWriter {
    /// Create a new writer targeting the given page size.
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }


    // -- Reconstruction -------------------------------------------------------

    /// Lay out edited text and an optional image as a new PDF.
    ///
    /// The image, when present, must decode as a raster image; it is placed
    /// once at the top of the first page and the text flows beneath it.
    #[instrument(
        skip(self, text, image),
        fields(
            text_len = text.content.len(),
            font = text.font_family.name(),
            image_len = image.map(<[u8]>::len)
        )
    )]
    pub fn reconstruct(&self, text: &EditableText, image: Option<&[u8]>) -> Result<Vec<u8>> {
        let embedded = match image {
            Some(bytes) => Some(self.prepare_image(bytes)?),
            None => None,
        };
        let dims = embedded
            .as_ref()
            .map(|img| (img.raw.width as u32, img.raw.height as u32));

        let layout = self.layout_text(text, dims);
        info!(
            pages = layout.page_count(),
            alignment = ?text.alignment,
            with_image = embedded.is_some(),
            "Reconstructing PDF"
        );

        Ok(self.render(&layout, embedded))
    }

    /// Pagination of `text` without producing bytes.
    ///
    /// `image_dims` are the pixel dimensions of an embedded image, which
    /// change how much of the first page is left for text.
    pub fn layout_text(&self, text: &EditableText, image_dims: Option<(u32, u32)>) -> Layout {
        let mut engine = LayoutEngine::new(self.page_size, text.alignment);
        if let Some((w, h)) = image_dims {
            let placement = ImagePlacement::fit(engine.geometry(), w, h);
            engine = engine.with_first_page_reserved(placement.reserved_height());
        }
        engine.layout(&paragraphs_from_text(&text.content, text.font_family))
    }

    // -- Blocks ---------------------------------------------------------------

    /// Render pre-parsed blocks with the given engine settings.
    #[instrument(skip(self, engine, blocks), fields(blocks = blocks.len()))]
    pub fn create_from_blocks(&self, engine: &LayoutEngine, blocks: &[Block]) -> Vec<u8> {
        let layout = engine.layout(blocks);
        info!(pages = layout.page_count(), paper = ?self.page_size, "Creating document PDF");
        self.render(&layout, None)
    }

    // -- Image to PDF ---------------------------------------------------------

    /// Create a single-page PDF containing the given image.
    ///
    /// The image is centred in the text frame and scaled down to fit it,
    /// preserving its aspect ratio.
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len()))]
    pub fn create_from_image(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = ::image::load_from_memory(image_bytes).map_err(|err| {
            WandelwerkError::DecodeError(format!("failed to decode image for PDF: {err}"))
        })?;
        let raw = raw_image(&decoded);
        let geometry = PageGeometry::for_page_size(self.page_size);
        let placement = ImagePlacement::centered(&geometry, raw.width as u32, raw.height as u32);
        info!(
            paper = ?self.page_size,
            width_pt = placement.width_pt,
            height_pt = placement.height_pt,
            scale = placement.scale,
            "Creating image PDF"
        );

        let layout = LayoutEngine::new(self.page_size, Alignment::Left).layout(&[]);
        Ok(self.render(&layout, Some(EmbeddedImage { raw, placement })))
    }

    // -- Rendering ------------------------------------------------------------

    fn prepare_image(&self, bytes: &[u8]) -> Result<EmbeddedImage> {
        let decoded = ::image::load_from_memory(bytes)
            .map_err(|err| WandelwerkError::InvalidImage(format!("cannot decode image: {err}")))?;
        let raw = raw_image(&decoded);
        let geometry = PageGeometry::for_page_size(self.page_size);
        let placement = ImagePlacement::fit(&geometry, raw.width as u32, raw.height as u32);
        Ok(EmbeddedImage { raw, placement })
    }

    fn render(&self, layout: &Layout, image: Option<EmbeddedImage>) -> Vec<u8> {
        let (w_mm, h_mm) = self.page_size.dimensions_mm();
        let (page_w, page_h) = (Mm(w_mm), Mm(h_mm));

        let mut doc = PdfDocument::new(DOCUMENT_TITLE);
        let mut image_op = image.map(|img| {
            let id = doc.add_image(&img.raw);
            Op::UseXobject {
                id,
                transform: image_transform(img.placement.x_pt, img.placement.y_pt, img.placement.scale),
            }
        });

        let mut substituted = 0usize;
        let mut pages = Vec::with_capacity(layout.page_count());
        for page in &layout.pages {
            let mut ops: Vec<Op> = Vec::with_capacity(page.lines.len() * 5 + 1);
            if let Some(op) = image_op.take() {
                ops.push(op);
            }
            let mut registered: Vec<BuiltinFont> = Vec::new();
            for line in &page.lines {
                let font = builtin_font(line.font);
                if !registered.contains(&font) {
                    registered.push(font);
                    ops.push(Op::WriteTextBuiltinFont {
                        items: Vec::new(),
                        font,
                    });
                }
                substituted += line
                    .text
                    .chars()
                    .filter(|&ch| !ch.is_whitespace() && !encoding::is_encodable(ch))
                    .count();

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(line.x_pt),
                        y: Pt(line.baseline_pt),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(FONT_SIZE_PT),
                    font,
                });
                ops.push(show_text(&line.text));
                ops.push(Op::EndTextSection);
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if substituted > 0 {
            warn!(substituted, "Characters outside WinAnsi were replaced with '?'");
        }
        doc.with_pages(pages);
        debug!(pages = doc.pages.len(), "PDF pages assembled");
        save(&doc)
    }
}

/// `Tj` with the WinAnsi bytes of `text`.
fn show_text(text: &str) -> Op {
    Op::Unknown {
        key: "Tj".into(),
        value: vec![DictItem::String {
            data: encoding::encode(text),
            literal: false,
        }],
    }
}

fn raw_image(image: &DynamicImage) -> RawImage {
    let rgb = image.to_rgb8();
    RawImage {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        pixels: RawImageData::U8(rgb.into_raw()),
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

fn image_transform(x_pt: f32, y_pt: f32, scale: f32) -> XObjectTransform {
    XObjectTransform {
        translate_x: Some(Pt(x_pt)),
        translate_y: Some(Pt(y_pt)),
        scale_x: Some(scale),
        scale_y: Some(scale),
        dpi: Some(IMAGE_DPI),
        rotate: None,
    }
}

fn save(doc: &PdfDocument) -> Vec<u8> {
    // `secure` would drop the raw `Tj` operators.
    let options = PdfSaveOptions {
        secure: false,
        ..Default::default()
    };
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&options, &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "printpdf reported warnings while saving");
    }
    output
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, Rgb, RgbImage};
    use lopdf::content::Content;
    use lopdf::{Document, Object};

    use super::*;
    use crate::pdf::PdfReader;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([200, 40, 40]));
        let mut out = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// String operands of every `Tj` on the first page.
    fn shown_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.page_iter().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(data, _)) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Translation of the first `cm` on the first page.
    fn image_origin(bytes: &[u8]) -> (f32, f32) {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.page_iter().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let cm = content.operations.iter().find(|op| op.operator == "cm").unwrap();
        let n: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
        (n[4], n[5])
    }

    fn text(content: &str) -> EditableText {
        EditableText {
            content: content.into(),
            font_family: FontFamily::Helvetica,
            alignment: Alignment::Left,
        }
    }

    #[test]
    fn empty_text_yields_single_page_pdf() {
        let bytes = PdfWriter::new(PageSize::A4).reconstruct(&text(""), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_text_spans_several_pages() {
        let content = (0..150)
            .map(|i| format!("Paragraph number {i} of the edited document."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let writer = PdfWriter::new(PageSize::A5);
        let expected = writer.layout_text(&text(&content), None).page_count();
        assert!(expected > 1);

        let bytes = writer.reconstruct(&text(&content), None).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), expected);
    }

    #[test]
    fn undecodable_image_is_rejected() {
        let err = PdfWriter::new(PageSize::A4)
            .reconstruct(&text("caption"), Some(b"definitely not an image"))
            .unwrap_err();
        assert!(matches!(err, WandelwerkError::InvalidImage(_)));
    }

    #[test]
    fn image_is_embedded_once() {
        let bytes = PdfWriter::new(PageSize::A4)
            .reconstruct(&text("caption under the picture"), Some(&png_bytes(64, 32)))
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let images = doc
            .objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .filter(|stream| {
                stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn image_reduces_room_for_text_on_first_page() {
        let content = (0..60).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let writer = PdfWriter::new(PageSize::A4);
        let plain = writer.layout_text(&text(&content), None);
        let with_image = writer.layout_text(&text(&content), Some((1200, 900)));
        assert!(with_image.pages[0].lines.len() < plain.pages[0].lines.len());
    }

    #[test]
    fn identical_inputs_paginate_identically() {
        let content = "The quick brown fox jumps over the lazy dog. ".repeat(80);
        let input = EditableText {
            content,
            font_family: FontFamily::TimesBoldItalic,
            alignment: Alignment::Right,
        };
        let writer = PdfWriter::new(PageSize::Letter);
        assert_eq!(
            writer.layout_text(&input, None).line_breaks(),
            writer.layout_text(&input, None).line_breaks()
        );
    }

    #[test]
    fn image_pdf_has_one_page() {
        let bytes = PdfWriter::new(PageSize::Legal)
            .create_from_image(&png_bytes(300, 500))
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn image_pdf_centres_the_image_in_the_frame() {
        let writer = PdfWriter::new(PageSize::A4);
        let bytes = writer.create_from_image(&png_bytes(300, 150)).unwrap();
        let expected = ImagePlacement::centered(&PageGeometry::for_page_size(PageSize::A4), 300, 150);
        let (x, y) = image_origin(&bytes);
        assert!((x - expected.x_pt).abs() < 0.5, "{x} vs {}", expected.x_pt);
        assert!((y - expected.y_pt).abs() < 0.5, "{y} vs {}", expected.y_pt);
    }

    #[test]
    fn non_ascii_text_is_written_as_win_ansi() {
        let bytes = PdfWriter::new(PageSize::A4).reconstruct(&text("Grüße café 5€"), None).unwrap();
        assert_eq!(shown_strings(&bytes), vec![b"Gr\xFC\xDFe caf\xE9 5\x80".to_vec()]);

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.page_iter().next().unwrap();
        let fonts = doc.get_page_fonts(page_id).unwrap();
        assert!(!fonts.is_empty());
        for font in fonts.values() {
            assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"WinAnsiEncoding");
        }
    }

    #[test]
    fn non_ascii_text_survives_extraction() {
        for font_family in [FontFamily::Helvetica, FontFamily::TimesBold, FontFamily::CourierOblique] {
            let input = EditableText {
                content: "Grüße café 5€".into(),
                font_family,
                alignment: Alignment::Left,
            };
            let bytes = PdfWriter::new(PageSize::A4).reconstruct(&input, None).unwrap();
            let extracted = PdfReader::from_bytes(&bytes).unwrap().extract_text().unwrap();
            assert_eq!(extracted.full_text, "Grüße café 5€");
        }
    }

    #[test]
    fn chars_outside_win_ansi_become_question_marks() {
        let bytes = PdfWriter::new(PageSize::A4).reconstruct(&text("a \u{2192} b \u{6F22}"), None).unwrap();
        assert_eq!(shown_strings(&bytes), vec![b"a ? b ?".to_vec()]);
    }

    #[test]
    fn image_pdf_rejects_garbage() {
        let err = PdfWriter::new(PageSize::A4).create_from_image(b"GIF?").unwrap_err();
        assert!(matches!(err, WandelwerkError::DecodeError(_)));
    }
}
