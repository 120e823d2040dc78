// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Wandelwerk conversion pipeline.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WandelwerkError;

/// URL namespace under which stored artifacts are served.
pub const ARTIFACT_NAMESPACE: &str = "/convert";

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Unique identifier for a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Recover the identifier from a public reference.
    ///
    /// Accepts `/convert/<uuid>.<ext>`, `<uuid>.<ext>` and a bare `<uuid>`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let file_name = reference.rsplit('/').next()?;
        let stem = file_name.split('.').next()?;
        Uuid::parse_str(stem).ok().map(Self)
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactState {
    /// Bytes are on disk; no reference has left the process yet.
    Stored,
    /// A reference has been handed to the caller.
    Served,
}

/// A persisted byte payload (upload or conversion output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub storage_path: PathBuf,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub state: ArtifactState,
    pub size_bytes: u64,
    /// SHA-256 of the stored bytes, lowercase hex.
    pub sha256: String,
}

impl Artifact {
    /// File name on disk: `<uuid>.<ext>`.
    pub fn file_name(&self) -> String {
        self.storage_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Public reference returned to clients, e.g. `/convert/<uuid>.pdf`.
    pub fn reference(&self) -> String {
        format!("{}/{}", ARTIFACT_NAMESPACE, self.file_name())
    }
}

// ---------------------------------------------------------------------------
// Conversion parameters
// ---------------------------------------------------------------------------

/// Raster encodings the image converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEncoding {
    Jpeg,
    Png,
    Webp,
}

impl ImageEncoding {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Requested output format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFormat {
    Image(ImageEncoding),
    Pdf,
    /// Office document output. Accepted on the wire, never produced.
    Document,
}

impl TargetFormat {
    /// Whether the target needs a page size.
    pub fn requires_page_size(&self) -> bool {
        matches!(self, Self::Pdf)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Image(ImageEncoding::Jpeg) => "jpeg",
            Self::Image(ImageEncoding::Png) => "png",
            Self::Image(ImageEncoding::Webp) => "webp",
            Self::Pdf => "pdf",
            Self::Document => "document",
        }
    }
}

impl FromStr for TargetFormat {
    type Err = WandelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "image-jpeg" => Ok(Self::Image(ImageEncoding::Jpeg)),
            "png" | "image-png" => Ok(Self::Image(ImageEncoding::Png)),
            "webp" | "image-webp" => Ok(Self::Image(ImageEncoding::Webp)),
            "pdf" => Ok(Self::Pdf),
            "doc" | "docx" | "document" => Ok(Self::Document),
            other => Err(WandelwerkError::InvalidRequest(format!(
                "unknown target format '{other}'"
            ))),
        }
    }
}

/// Coarse quality/size trade-off applied during re-encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Highest quality, least compression.
    #[default]
    Low,
    Medium,
    /// Lowest quality, most compression.
    High,
}

impl FromStr for CompressionLevel {
    type Err = WandelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(WandelwerkError::InvalidRequest(format!(
                "unknown compression level '{other}'"
            ))),
        }
    }
}

/// Standard page sizes offered for PDF output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    A5,
}

impl PageSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::A5 => (148.0, 210.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = WandelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "a5" => Ok(Self::A5),
            other => Err(WandelwerkError::InvalidRequest(format!(
                "unknown page size '{other}'"
            ))),
        }
    }
}

/// What the dispatcher knows about an upload from its declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A raster image the `image` crate can decode.
    Image,
    /// A text-bearing office document.
    Office(OfficeFormat),
    Unknown,
}

/// Office document formats the document converter can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeFormat {
    Docx,
    Odt,
    PlainText,
}

impl SourceKind {
    /// Infer the source kind from a file name's extension.
    pub fn from_file_name(name: &str) -> Self {
        let ext = extension_of(name).unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tif" | "tiff" => Self::Image,
            "docx" => Self::Office(OfficeFormat::Docx),
            "odt" => Self::Office(OfficeFormat::Odt),
            "txt" | "text" => Self::Office(OfficeFormat::PlainText),
            _ => Self::Unknown,
        }
    }
}

/// Lowercased extension of `name`, if it has one.
pub fn extension_of(name: &str) -> Option<String> {
    let file_name = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Uploaded bytes together with the client's file name.
#[derive(Debug, Clone)]
pub struct SourceArtifact {
    pub bytes: Vec<u8>,
    pub original_name: String,
}

/// A request to convert one upload into a target format.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: SourceArtifact,
    pub target_format: TargetFormat,
    pub compression_level: CompressionLevel,
    pub page_size: Option<PageSize>,
}

impl ConversionRequest {
    /// Check the request's own invariants before any work is done.
    pub fn validate(&self) -> Result<(), WandelwerkError> {
        if self.source.bytes.is_empty() {
            return Err(WandelwerkError::InvalidRequest(
                "uploaded file is empty".into(),
            ));
        }
        match (self.target_format.requires_page_size(), self.page_size) {
            (true, None) => Err(WandelwerkError::InvalidRequest(format!(
                "target '{}' requires a page size",
                self.target_format.name()
            ))),
            (false, Some(size)) => Err(WandelwerkError::InvalidRequest(format!(
                "page size {size:?} is only valid for pdf output"
            ))),
            _ => Ok(()),
        }
    }
}

/// A request to lay out edited text (and an optional image) as a new PDF.
#[derive(Debug, Clone, Default)]
pub struct ReconstructRequest {
    pub text: EditableText,
    pub image: Option<Vec<u8>>,
    pub page_size: Option<PageSize>,
}

// ---------------------------------------------------------------------------
// Text editing
// ---------------------------------------------------------------------------

/// The fourteen standard PDF faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl FontFamily {
    pub const ALL: [FontFamily; 14] = [
        Self::TimesRoman,
        Self::TimesBold,
        Self::TimesItalic,
        Self::TimesBoldItalic,
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaOblique,
        Self::HelveticaBoldOblique,
        Self::Courier,
        Self::CourierBold,
        Self::CourierOblique,
        Self::CourierBoldOblique,
        Self::Symbol,
        Self::ZapfDingbats,
    ];

    /// PostScript name, as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// The bold face of the same family. Symbol faces have no bold.
    pub fn bold(&self) -> Self {
        match self {
            Self::TimesRoman | Self::TimesBold => Self::TimesBold,
            Self::TimesItalic | Self::TimesBoldItalic => Self::TimesBoldItalic,
            Self::Helvetica | Self::HelveticaBold => Self::HelveticaBold,
            Self::HelveticaOblique | Self::HelveticaBoldOblique => Self::HelveticaBoldOblique,
            Self::Courier | Self::CourierBold => Self::CourierBold,
            Self::CourierOblique | Self::CourierBoldOblique => Self::CourierBoldOblique,
            Self::Symbol => Self::Symbol,
            Self::ZapfDingbats => Self::ZapfDingbats,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            Self::TimesBold
                | Self::TimesBoldItalic
                | Self::HelveticaBold
                | Self::HelveticaBoldOblique
                | Self::CourierBold
                | Self::CourierBoldOblique
        )
    }
}

impl FromStr for FontFamily {
    type Err = WandelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|font| font.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WandelwerkError::InvalidRequest(format!("unknown font '{wanted}'")))
    }
}

/// Horizontal alignment of each laid-out line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = WandelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(WandelwerkError::InvalidRequest(format!(
                "unknown alignment '{other}'"
            ))),
        }
    }
}

/// Text the user edits between extraction and reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableText {
    pub content: String,
    pub font_family: FontFamily,
    pub alignment: Alignment,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Text pulled out of a PDF, page by page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub pages: Vec<String>,
    pub full_text: String,
}

impl ExtractedDocument {
    /// Build from page texts, joining pages with a blank line.
    pub fn from_pages(pages: Vec<String>) -> Self {
        let full_text = pages.join("\n\n");
        Self { pages, full_text }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(target: TargetFormat, page_size: Option<PageSize>) -> ConversionRequest {
        ConversionRequest {
            source: SourceArtifact {
                bytes: vec![1, 2, 3],
                original_name: "report.docx".into(),
            },
            target_format: target,
            compression_level: CompressionLevel::Low,
            page_size,
        }
    }

    #[test]
    fn pdf_without_page_size_is_invalid() {
        let err = request(TargetFormat::Pdf, None).validate().unwrap_err();
        assert!(matches!(err, WandelwerkError::InvalidRequest(_)));
    }

    #[test]
    fn image_with_page_size_is_invalid() {
        let req = request(TargetFormat::Image(ImageEncoding::Png), Some(PageSize::A4));
        assert!(matches!(
            req.validate(),
            Err(WandelwerkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_source_is_invalid() {
        let mut req = request(TargetFormat::Pdf, Some(PageSize::A4));
        req.source.bytes.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn well_formed_requests_validate() {
        assert!(request(TargetFormat::Pdf, Some(PageSize::Letter)).validate().is_ok());
        assert!(
            request(TargetFormat::Image(ImageEncoding::Webp), None)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn target_format_wire_names() {
        assert_eq!(
            "jpg".parse::<TargetFormat>().unwrap(),
            TargetFormat::Image(ImageEncoding::Jpeg)
        );
        assert_eq!("PDF".parse::<TargetFormat>().unwrap(), TargetFormat::Pdf);
        assert_eq!("doc".parse::<TargetFormat>().unwrap(), TargetFormat::Document);
        assert!("gif".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn font_names_round_trip_through_parse() {
        for font in FontFamily::ALL {
            assert_eq!(font.name().parse::<FontFamily>().unwrap(), font);
        }
        assert!("Comic-Sans".parse::<FontFamily>().is_err());
    }

    #[test]
    fn bold_variant_keeps_family_and_slant() {
        assert_eq!(FontFamily::TimesItalic.bold(), FontFamily::TimesBoldItalic);
        assert_eq!(FontFamily::Courier.bold(), FontFamily::CourierBold);
        assert_eq!(FontFamily::Symbol.bold(), FontFamily::Symbol);
    }

    #[test]
    fn compression_levels_are_ordered() {
        assert!(CompressionLevel::Low < CompressionLevel::Medium);
        assert!(CompressionLevel::Medium < CompressionLevel::High);
        assert_eq!("HIGH".parse::<CompressionLevel>().unwrap(), CompressionLevel::High);
    }

    #[test]
    fn source_kind_from_extension() {
        assert_eq!(SourceKind::from_file_name("photo.JPG"), SourceKind::Image);
        assert_eq!(
            SourceKind::from_file_name("dir/letter.docx"),
            SourceKind::Office(OfficeFormat::Docx)
        );
        assert_eq!(SourceKind::from_file_name("notes"), SourceKind::Unknown);
        assert_eq!(SourceKind::from_file_name(".bashrc"), SourceKind::Unknown);
    }

    #[test]
    fn artifact_id_from_reference() {
        let id = ArtifactId::new();
        let reference = format!("/convert/{id}.pdf");
        assert_eq!(ArtifactId::from_reference(&reference), Some(id));
        assert_eq!(ArtifactId::from_reference(&id.to_string()), Some(id));
        assert_eq!(ArtifactId::from_reference("/convert/output.pdf"), None);
    }

    #[test]
    fn extracted_document_joins_pages_with_blank_line() {
        let doc = ExtractedDocument::from_pages(vec!["one".into(), "two".into()]);
        assert_eq!(doc.full_text, "one\n\ntwo");
        assert_eq!(ExtractedDocument::from_pages(Vec::new()).full_text, "");
    }
}
