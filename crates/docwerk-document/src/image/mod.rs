// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: raster decoding and conversion into PDF image XObjects.

pub mod processor;

pub use processor::{ColorSpace, EmbeddableImage, ImageEncoding, RasterImage};
