// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — text extraction, line layout, and PDF creation.

pub mod encoding;
pub mod layout;
pub mod metrics;
pub mod reader;
pub mod writer;

pub use layout::{Block, Layout, LayoutEngine};
pub use reader::PdfReader;
pub use writer::PdfWriter;
