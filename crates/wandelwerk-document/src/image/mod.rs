// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — raster re-encoding between JPEG, PNG and WebP.

pub mod converter;

pub use converter::ImageConverter;
