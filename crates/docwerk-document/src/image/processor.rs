// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image handling: decode uploaded images and turn them into pixel
// data a PDF image XObject can carry, either natively (JPEG passthrough,
// Flate-compressed samples) or by re-encoding to JPEG.

use docwerk_core::Rgb;
use docwerk_core::error::{DocwerkError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, Stream};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Embeddable image data
// ---------------------------------------------------------------------------

/// Colour model of an embedded image's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ColorSpace {
    fn pdf_name(&self) -> &'static str {
        match self {
            Self::DeviceRgb => "DeviceRGB",
            Self::DeviceGray => "DeviceGray",
        }
    }
}

/// How the sample data of an [`EmbeddableImage`] is stored.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageEncoding {
    /// A complete baseline JPEG file, stored with `/DCTDecode`.
    Jpeg(Vec<u8>),
    /// Uncompressed 8-bit samples, Flate-compressed on embedding.
    Raw(Vec<u8>),
}

impl std::fmt::Debug for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg(data) => write!(f, "Jpeg({} bytes)", data.len()),
            Self::Raw(data) => write!(f, "Raw({} bytes)", data.len()),
        }
    }
}

/// Pixel data ready to become an image XObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddableImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub encoding: ImageEncoding,
}

impl EmbeddableImage {
    /// Build the XObject stream for this image.
    pub(crate) fn to_stream(&self) -> Stream {
        let mut dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(self.width as i64)),
            ("Height", Object::Integer(self.height as i64)),
            (
                "ColorSpace",
                Object::Name(self.color_space.pdf_name().into()),
            ),
            ("BitsPerComponent", Object::Integer(8)),
        ]);

        match &self.encoding {
            ImageEncoding::Jpeg(data) => {
                dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
                Stream::new(dict, data.clone()).with_compression(false)
            }
            ImageEncoding::Raw(samples) => {
                let mut stream = Stream::new(dict, samples.clone());
                // Falls back to storing the samples uncompressed.
                let _ = stream.compress();
                stream
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RasterImage
// ---------------------------------------------------------------------------

/// A decoded raster image together with its original encoded bytes.
pub struct RasterImage {
    image: DynamicImage,
    format: ImageFormat,
    source: Vec<u8>,
}

impl RasterImage {
    /// Decode an image from its encoded bytes (JPEG, PNG, GIF, BMP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&data).map_err(|err| {
            DocwerkError::ImageError(format!("unrecognised image format: {err}"))
        })?;
        let image = image::load_from_memory_with_format(&data, format).map_err(|err| {
            DocwerkError::ImageError(format!("failed to decode image: {err}"))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            ?format,
            "Image decoded from bytes"
        );
        Ok(Self {
            image,
            format,
            source: data,
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel area, used to pick the reference image for automatic page
    /// sizing.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    // -- Embedding ------------------------------------------------------------

    /// Embed without lossy re-encoding: JPEG bytes pass through unchanged,
    /// anything else becomes 8-bit samples. Transparency is flattened onto
    /// `background`.
    pub fn native_embedding(&self, background: Rgb) -> Result<EmbeddableImage> {
        if self.format == ImageFormat::Jpeg {
            let color_space = match jpeg_component_count(&self.source) {
                Some(1) => ColorSpace::DeviceGray,
                Some(3) => ColorSpace::DeviceRgb,
                Some(n) => {
                    return Err(DocwerkError::ImageError(format!(
                        "JPEG with {n} colour components cannot pass through"
                    )));
                }
                None => {
                    return Err(DocwerkError::ImageError(
                        "JPEG frame header not found".into(),
                    ));
                }
            };
            return Ok(EmbeddableImage {
                width: self.width(),
                height: self.height(),
                color_space,
                encoding: ImageEncoding::Jpeg(self.source.clone()),
            });
        }

        let color = self.image.color();
        if !color.has_alpha() && !color.has_color() {
            let luma = self.image.to_luma8();
            return Ok(EmbeddableImage {
                width: luma.width(),
                height: luma.height(),
                color_space: ColorSpace::DeviceGray,
                encoding: ImageEncoding::Raw(luma.into_raw()),
            });
        }

        let rgb = self.flattened(background);
        Ok(EmbeddableImage {
            width: rgb.width(),
            height: rgb.height(),
            color_space: ColorSpace::DeviceRgb,
            encoding: ImageEncoding::Raw(rgb.into_raw()),
        })
    }

    /// Re-encode as an RGB JPEG at `quality` (1-100).
    #[instrument(skip(self, background), fields(width = self.width(), height = self.height()))]
    pub fn jpeg_embedding(&self, quality: u8, background: Rgb) -> Result<EmbeddableImage> {
        let rgb = self.flattened(background);
        let mut buffer = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| DocwerkError::ImageError(format!("JPEG encoding failed: {err}")))?;
        debug!(bytes = buffer.len(), quality, "Image re-encoded as JPEG");
        Ok(EmbeddableImage {
            width: rgb.width(),
            height: rgb.height(),
            color_space: ColorSpace::DeviceRgb,
            encoding: ImageEncoding::Jpeg(buffer),
        })
    }

    /// RGB copy of the image with alpha composited over `background`.
    fn flattened(&self, background: Rgb) -> RgbImage {
        if !self.image.color().has_alpha() {
            return self.image.to_rgb8();
        }
        let rgba = self.image.to_rgba8();
        let Rgb { r, g, b } = background;
        image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let image::Rgba([pr, pg, pb, alpha]) = *rgba.get_pixel(x, y);
            let blend = |fg: u8, bg: u8| -> u8 {
                let a = alpha as u32;
                ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
            };
            image::Rgb([blend(pr, r), blend(pg, g), blend(pb, b)])
        })
    }
}

/// Number of colour components declared by the first JPEG frame header.
fn jpeg_component_count(data: &[u8]) -> Option<u8> {
    if data.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let is_frame = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(pos + 9).copied();
        }
        pos += 2 + length;
    }
    None
}
