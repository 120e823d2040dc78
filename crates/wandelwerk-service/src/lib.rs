// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wandelwerk-service — The conversion dispatcher and the on-disk artifact
// store it persists inputs and outputs in.
//
// Converters are CPU-bound and run on tokio's blocking pool under per-operation
// time limits. Every stored artifact is deleted shortly after it is served, or
// immediately when its request fails.

pub mod dispatcher;
pub mod integrity;
pub mod store;

pub use dispatcher::ConversionDispatcher;
pub use store::{ArtifactGuard, ArtifactStore};
