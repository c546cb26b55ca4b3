// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strongly typed options for each operation kind.

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Options for combining documents. Page order follows input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {}

/// How a split selects pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitMode {
    /// One single-page document per source page.
    AllPages,
    /// One document holding the contiguous `start..=end` pages.
    Range,
    /// One single-page document per requested index.
    SpecificPages,
}

/// Split options. Page indices are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub mode: SplitMode,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
    #[serde(default)]
    pub pages: Option<Vec<u32>>,
}

impl SplitOptions {
    pub fn all_pages() -> Self {
        Self {
            mode: SplitMode::AllPages,
            start: None,
            end: None,
            pages: None,
        }
    }

    pub fn range(start: u32, end: u32) -> Self {
        Self {
            mode: SplitMode::Range,
            start: Some(start),
            end: Some(end),
            pages: None,
        }
    }

    pub fn specific(pages: Vec<u32>) -> Self {
        Self {
            mode: SplitMode::SpecificPages,
            start: None,
            end: None,
            pages: Some(pages),
        }
    }
}

/// Absolute rotation applied to selected pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateOptions {
    /// Any multiple of 90, normalised into `0..360` when applied.
    pub angle: i64,
    /// 0-based page indices; `None` selects every page.
    #[serde(default)]
    pub pages: Option<Vec<u32>>,
}

/// Named anchor for watermark placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkOptions {
    pub text: String,
    pub font_size: f32,
    /// 0..=100, mapped to a 0.0..=1.0 fill alpha.
    pub opacity_percent: u8,
    pub rotation_degrees: f32,
    #[serde(default)]
    pub position: WatermarkPosition,
    pub color: Rgb,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: "CONFIDENTIAL".into(),
            font_size: 48.0,
            opacity_percent: 30,
            rotation_degrees: 45.0,
            position: WatermarkPosition::Center,
            color: Rgb::GRAY,
        }
    }
}

/// Target page size for image conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    /// Derived from the largest input image's aspect ratio.
    Auto,
}

impl PageSize {
    /// Portrait dimensions in points, or `None` for [`PageSize::Auto`].
    pub fn dimensions_pt(&self) -> Option<(f32, f32)> {
        match self {
            Self::A4 => Some((595.28, 841.89)),
            Self::Letter => Some((612.0, 792.0)),
            Self::Auto => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// How an image is scaled onto its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageLayout {
    /// Largest size that fits both dimensions, aspect ratio preserved.
    #[default]
    FitToPage,
    /// Native pixel dimensions, one pixel per point.
    ActualSize,
    /// Scaled to the available width; may overflow vertically.
    FitWidth,
    /// Scaled to the available height; may overflow horizontally.
    FitHeight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageToDocumentOptions {
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub orientation: PageOrientation,
    #[serde(default)]
    pub layout: ImageLayout,
    pub margin_points: f32,
    /// JPEG quality (1..=100) used when an image has to be re-encoded.
    pub quality: u8,
    #[serde(default)]
    pub background_color: Option<Rgb>,
}

impl Default for ImageToDocumentOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: PageOrientation::Portrait,
            layout: ImageLayout::FitToPage,
            margin_points: 36.0,
            quality: 85,
            background_color: None,
        }
    }
}

/// Coarse quality tier driving the structural save parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompressionQuality {
    /// Smallest output: every structural optimisation.
    Low,
    #[default]
    Medium,
    /// Closest to the input: stream compression only.
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressOptions {
    #[serde(default)]
    pub quality: CompressionQuality,
    #[serde(default)]
    pub remove_metadata: bool,
    /// Recorded for the caller; embedded rasters are never re-encoded.
    #[serde(default)]
    pub image_compression_hint: Option<u8>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: CompressionQuality::Medium,
            remove_metadata: true,
            image_compression_hint: None,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordWrapOptions {
    pub password: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordUnwrapOptions {
    pub password: String,
}

// Passwords never reach log output.
impl std::fmt::Debug for PasswordWrapOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordWrapOptions")
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for PasswordUnwrapOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordUnwrapOptions")
            .field("password", &"<redacted>")
            .finish()
    }
}
