// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Wandelwerk.

use std::time::Duration;

use thiserror::Error;

use crate::types::ArtifactId;

/// Top-level error type for all Wandelwerk operations.
#[derive(Debug, Error)]
pub enum WandelwerkError {
    // -- Request errors --
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unsupported target encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unsupported source format: {0}")]
    UnsupportedSourceFormat(String),

    // -- Input content errors --
    #[error("image could not be decoded: {0}")]
    DecodeError(String),

    #[error("malformed PDF document: {0}")]
    MalformedDocument(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    // -- Processing errors --
    #[error("{operation} exceeded its time budget of {}s", .limit.as_secs())]
    ConversionTimeout {
        operation: &'static str,
        limit: Duration,
    },

    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    // -- Storage --
    #[error("artifact {0} not found")]
    NotFound(ArtifactId),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WandelwerkError>;
