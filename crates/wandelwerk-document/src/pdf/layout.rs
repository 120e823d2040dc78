// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — paragraph splitting, whitespace wrapping, alignment and
// pagination.
//
// Everything here is pure arithmetic over the input text and page geometry, so
// the same text, font, alignment, page size and image dimensions always yield
// the same line breaks and page count. The PDF writer only serialises the
// result.

use printpdf::Mm;
use tracing::debug;
use wandelwerk_core::{Alignment, FontFamily, PageSize};

use super::metrics::text_width_pt;

/// Body font size in points.
pub const FONT_SIZE_PT: f32 = 11.0;
/// Distance between consecutive baselines in points.
pub const LINE_HEIGHT_PT: f32 = 14.0;
/// Margin on every side of the page.
pub const MARGIN_MM: f32 = 20.0;
/// Resolution at which an embedded image is rendered at scale 1.0.
pub const IMAGE_DPI: f32 = 150.0;
/// Largest share of the text frame height an embedded image may occupy.
pub const IMAGE_MAX_FRAME_SHARE: f32 = 0.4;

// -- Geometry -----------------------------------------------------------------

/// Page dimensions and the text frame inside the margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    pub fn for_page_size(page_size: PageSize) -> Self {
        let (w_mm, h_mm) = page_size.dimensions_mm();
        Self {
            width_pt: Mm(w_mm).into_pt().0,
            height_pt: Mm(h_mm).into_pt().0,
            margin_pt: Mm(MARGIN_MM).into_pt().0,
        }
    }

    pub fn frame_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn frame_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }

    /// Top edge of the text frame (PDF y grows upward).
    pub fn frame_top(&self) -> f32 {
        self.height_pt - self.margin_pt
    }

    pub fn frame_bottom(&self) -> f32 {
        self.margin_pt
    }
}

/// Where an embedded image sits on the first page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Lower-left corner.
    pub x_pt: f32,
    pub y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
    /// Scale relative to the image's size at [`IMAGE_DPI`].
    pub scale: f32,
}

impl ImagePlacement {
    /// Fit an image of `width_px` x `height_px` at the top of the frame,
    /// centred, within the frame width and [`IMAGE_MAX_FRAME_SHARE`] of its
    /// height. Never upscales past [`IMAGE_DPI`].
    pub fn fit(geometry: &PageGeometry, width_px: u32, height_px: u32) -> Self {
        let native_w_pt = width_px.max(1) as f32 / IMAGE_DPI * 72.0;
        let native_h_pt = height_px.max(1) as f32 / IMAGE_DPI * 72.0;

        let max_w = geometry.frame_width();
        let max_h = geometry.frame_height() * IMAGE_MAX_FRAME_SHARE;
        let scale = (max_w / native_w_pt).min(max_h / native_h_pt).min(1.0);

        let width_pt = native_w_pt * scale;
        let height_pt = native_h_pt * scale;

        Self {
            x_pt: geometry.margin_pt + (max_w - width_pt) / 2.0,
            y_pt: geometry.frame_top() - height_pt,
            width_pt,
            height_pt,
            scale,
        }
    }

    /// Fit an image in the whole frame, centred both ways. Used when the
    /// image is the only content of its page.
    pub fn centered(geometry: &PageGeometry, width_px: u32, height_px: u32) -> Self {
        let native_w_pt = width_px.max(1) as f32 / IMAGE_DPI * 72.0;
        let native_h_pt = height_px.max(1) as f32 / IMAGE_DPI * 72.0;

        let max_w = geometry.frame_width();
        let max_h = geometry.frame_height();
        let scale = (max_w / native_w_pt).min(max_h / native_h_pt).min(1.0);

        let width_pt = native_w_pt * scale;
        let height_pt = native_h_pt * scale;

        Self {
            x_pt: geometry.margin_pt + (max_w - width_pt) / 2.0,
            y_pt: geometry.frame_bottom() + (max_h - height_pt) / 2.0,
            width_pt,
            height_pt,
            scale,
        }
    }

    /// Vertical space the image takes away from the first page's text frame,
    /// including a one-line gap below it.
    pub fn reserved_height(&self) -> f32 {
        self.height_pt + LINE_HEIGHT_PT
    }
}

// -- Input blocks -------------------------------------------------------------

/// A unit of flowing content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Text whose `\n` characters are hard line breaks.
    Paragraph { text: String, font: FontFamily },
    /// Start a new page.
    PageBreak,
}

/// Split free text into paragraphs on blank lines.
///
/// A line holding only whitespace counts as blank. Runs of blank lines form a
/// single boundary. Content without any text yields no blocks.
pub fn paragraphs_from_text(content: &str, font: FontFamily) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(Block::Paragraph {
                    text: current.join("\n"),
                    font,
                });
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(Block::Paragraph {
            text: current.join("\n"),
            font,
        });
    }

    blocks
}

/// Greedy whitespace wrap of one hard line.
///
/// Words are never split; a word wider than `max_width_pt` sits alone on its
/// line. A line without words yields a single empty line.
pub fn wrap_line(line: &str, font: FontFamily, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let space_w = text_width_pt(font, size_pt, " ");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0_f32;

    for word in line.split_whitespace() {
        let word_w = text_width_pt(font, size_pt, word);
        if current.is_empty() {
            current.push_str(word);
            current_w = word_w;
        } else if current_w + space_w + word_w <= max_width_pt {
            current.push(' ');
            current.push_str(word);
            current_w += space_w + word_w;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_w = word_w;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// -- Output -------------------------------------------------------------------

/// One glyph run placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub font: FontFamily,
    pub x_pt: f32,
    pub baseline_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// The result of laying out a sequence of blocks. Always holds at least one
/// page.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub geometry: PageGeometry,
    pub pages: Vec<PageLayout>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of every placed line, grouped by page.
    pub fn line_breaks(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .map(|page| page.lines.iter().map(|line| line.text.clone()).collect())
            .collect()
    }
}

// -- Engine -------------------------------------------------------------------

/// Flows blocks into pages of a fixed geometry.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    alignment: Alignment,
    font_size_pt: f32,
    line_height_pt: f32,
    /// Extra space between paragraphs, in lines.
    paragraph_spacing: f32,
    /// Space taken from the top of the first page (embedded image).
    first_page_reserved_pt: f32,
}

impl LayoutEngine {
    pub fn new(page_size: PageSize, alignment: Alignment) -> Self {
        Self {
            geometry: PageGeometry::for_page_size(page_size),
            alignment,
            font_size_pt: FONT_SIZE_PT,
            line_height_pt: LINE_HEIGHT_PT,
            paragraph_spacing: 1.0,
            first_page_reserved_pt: 0.0,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Set the gap between paragraphs, in lines.
    pub fn with_paragraph_spacing(mut self, lines: f32) -> Self {
        self.paragraph_spacing = lines.max(0.0);
        self
    }

    /// Keep `height_pt` free at the top of the first page.
    pub fn with_first_page_reserved(mut self, height_pt: f32) -> Self {
        self.first_page_reserved_pt = height_pt.clamp(0.0, self.geometry.frame_height());
        self
    }

    /// Lay out `blocks`. Empty input produces one blank page.
    pub fn layout(&self, blocks: &[Block]) -> Layout {
        let mut cursor = Cursor::new(self);

        for block in blocks {
            match block {
                Block::PageBreak => cursor.explicit_break(),
                Block::Paragraph { text, font } => {
                    if cursor.page_has_content() {
                        cursor.advance(self.line_height_pt * self.paragraph_spacing);
                    }
                    for hard_line in text.split('\n') {
                        for line in wrap_line(
                            hard_line,
                            *font,
                            self.font_size_pt,
                            self.geometry.frame_width(),
                        ) {
                            cursor.place(line, *font);
                        }
                    }
                }
            }
        }

        let pages = cursor.finish();
        debug!(
            blocks = blocks.len(),
            pages = pages.len(),
            "layout complete"
        );
        Layout {
            geometry: self.geometry,
            pages,
        }
    }

    fn line_x(&self, text: &str, font: FontFamily) -> f32 {
        let left = self.geometry.margin_pt;
        let slack = (self.geometry.frame_width() - text_width_pt(font, self.font_size_pt, text))
            .max(0.0);
        match self.alignment {
            Alignment::Left => left,
            Alignment::Center => left + slack / 2.0,
            Alignment::Right => left + slack,
        }
    }
}

/// Mutable pagination state for one `layout` call.
struct Cursor<'a> {
    engine: &'a LayoutEngine,
    pages: Vec<PageLayout>,
    current: PageLayout,
    /// Baseline of the next line to place.
    next_baseline: f32,
    /// Whether anything (text or blank line) was placed on the current page.
    advanced: bool,
}

impl<'a> Cursor<'a> {
    fn new(engine: &'a LayoutEngine) -> Self {
        let top = engine.geometry.frame_top() - engine.first_page_reserved_pt;
        Self {
            engine,
            pages: Vec::new(),
            current: PageLayout::default(),
            next_baseline: top - engine.font_size_pt,
            advanced: false,
        }
    }

    fn page_has_content(&self) -> bool {
        self.advanced
    }

    fn advance(&mut self, by_pt: f32) {
        self.next_baseline -= by_pt;
    }

    fn place(&mut self, text: String, font: FontFamily) {
        if self.next_baseline < self.engine.geometry.frame_bottom() {
            self.break_page();
        }
        if !text.is_empty() {
            let x_pt = self.engine.line_x(&text, font);
            self.current.lines.push(PlacedLine {
                text,
                font,
                x_pt,
                baseline_pt: self.next_baseline,
            });
        }
        self.advanced = true;
        self.next_baseline -= self.engine.line_height_pt;
    }

    /// A requested break. Nothing to break away from before the first line.
    fn explicit_break(&mut self) {
        if self.pages.is_empty() && !self.advanced {
            return;
        }
        self.break_page();
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.next_baseline = self.engine.geometry.frame_top() - self.engine.font_size_pt;
        self.advanced = false;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if self.advanced || self.pages.is_empty() || !self.current.lines.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
