// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image converter — decode any raster format the `image` crate recognises and
// re-encode it as JPEG, PNG or WebP at a requested compression level.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, Rgb, RgbImage};
use tracing::{debug, info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::{CompressionLevel, ImageEncoding, TargetFormat};

/// JPEG quality per compression level. Stronger compression, lower quality.
pub const JPEG_QUALITY_LOW: u8 = 92;
pub const JPEG_QUALITY_MEDIUM: u8 = 75;
pub const JPEG_QUALITY_HIGH: u8 = 50;

/// Re-encodes raster images.
pub struct ImageConverter;

impl ImageConverter {
    /// Convert `bytes` to an image `target` at `level`.
    ///
    /// Targets other than an image encoding are refused with
    /// `UnsupportedEncoding`.
    pub fn convert(bytes: &[u8], target: TargetFormat, level: CompressionLevel) -> Result<Vec<u8>> {
        match target {
            TargetFormat::Image(encoding) => Self::encode(bytes, encoding, level),
            other => Err(WandelwerkError::UnsupportedEncoding(format!(
                "{} is not an image encoding",
                other.name()
            ))),
        }
    }

    /// Decode `bytes` and re-encode them as `encoding`.
    #[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
    pub fn encode(bytes: &[u8], encoding: ImageEncoding, level: CompressionLevel) -> Result<Vec<u8>> {
        let image = ::image::load_from_memory(bytes)
            .map_err(|err| WandelwerkError::DecodeError(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Image decoded from bytes"
        );

        let output = match encoding {
            ImageEncoding::Jpeg => to_jpeg(&image, jpeg_quality(level))?,
            ImageEncoding::Png => to_png(&image, level)?,
            ImageEncoding::Webp => to_webp(&image)?,
        };

        info!(
            encoding = encoding.extension(),
            input_bytes = bytes.len(),
            output_bytes = output.len(),
            "Image converted"
        );
        Ok(output)
    }
}

pub fn jpeg_quality(level: CompressionLevel) -> u8 {
    match level {
        CompressionLevel::Low => JPEG_QUALITY_LOW,
        CompressionLevel::Medium => JPEG_QUALITY_MEDIUM,
        CompressionLevel::High => JPEG_QUALITY_HIGH,
    }
}

fn png_settings(level: CompressionLevel) -> (CompressionType, FilterType) {
    match level {
        CompressionLevel::Low => (CompressionType::Fast, FilterType::NoFilter),
        CompressionLevel::Medium => (CompressionType::Default, FilterType::Adaptive),
        CompressionLevel::High => (CompressionType::Best, FilterType::Adaptive),
    }
}

fn to_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = flatten_alpha(image);
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| WandelwerkError::ConversionFailed(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}

fn to_png(image: &DynamicImage, level: CompressionLevel) -> Result<Vec<u8>> {
    let (compression, filter) = png_settings(level);
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, compression, filter);
    // PNG has no floating-point samples.
    let image = match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => DynamicImage::ImageRgba16(image.to_rgba16()),
        _ => image.clone(),
    };
    image
        .write_with_encoder(encoder)
        .map_err(|err| WandelwerkError::ConversionFailed(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

/// WebP is always written lossless.
fn to_webp(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut buffer);
    let result = if image.color().has_alpha() {
        image.to_rgba8().write_with_encoder(encoder)
    } else {
        image.to_rgb8().write_with_encoder(encoder)
    };
    result.map_err(|err| WandelwerkError::ConversionFailed(format!("WebP encoding failed: {err}")))?;
    Ok(buffer)
}

/// Composite any alpha channel over white.
fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            ((c * a + 255 * (255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
