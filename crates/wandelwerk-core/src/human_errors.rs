// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and caller-facing error classification.
//
// Every technical error maps to a stable kind string, a class that decides the
// transport status, and a plain-language message with a suggestion.

use crate::error::WandelwerkError;

/// Who is responsible for an error, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request or its bytes are wrong. Retrying unchanged will fail again.
    ClientInput,
    /// The referenced artifact does not exist (or was already cleaned up).
    NotFound,
    /// Processing ran out of time. The caller may retry with a simpler input.
    Timeout,
    /// Unexpected failure on our side.
    Server,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Stable machine-readable kind, e.g. `InvalidRequest`.
    pub kind: &'static str,
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub class: ErrorClass,
}

/// Stable kind name of an error, used in error payloads.
pub fn error_kind(err: &WandelwerkError) -> &'static str {
    match err {
        WandelwerkError::InvalidRequest(_) => "InvalidRequest",
        WandelwerkError::UnsupportedEncoding(_) => "UnsupportedEncoding",
        WandelwerkError::UnsupportedSourceFormat(_) => "UnsupportedSourceFormat",
        WandelwerkError::DecodeError(_) => "DecodeError",
        WandelwerkError::MalformedDocument(_) => "MalformedDocument",
        WandelwerkError::InvalidImage(_) => "InvalidImage",
        WandelwerkError::ConversionTimeout { .. } => "ConversionTimeout",
        WandelwerkError::ConversionFailed(_) => "ConversionFailed",
        WandelwerkError::NotFound(_) => "NotFound",
        WandelwerkError::Io(_) | WandelwerkError::Serialization(_) => "ConversionFailed",
    }
}

/// Classify an error for transport status selection.
pub fn classify(err: &WandelwerkError) -> ErrorClass {
    match err {
        WandelwerkError::InvalidRequest(_)
        | WandelwerkError::UnsupportedEncoding(_)
        | WandelwerkError::UnsupportedSourceFormat(_)
        | WandelwerkError::DecodeError(_)
        | WandelwerkError::MalformedDocument(_)
        | WandelwerkError::InvalidImage(_) => ErrorClass::ClientInput,
        WandelwerkError::NotFound(_) => ErrorClass::NotFound,
        WandelwerkError::ConversionTimeout { .. } => ErrorClass::Timeout,
        WandelwerkError::ConversionFailed(_)
        | WandelwerkError::Io(_)
        | WandelwerkError::Serialization(_) => ErrorClass::Server,
    }
}

/// Convert a `WandelwerkError` into a `HumanError` anyone can understand.
pub fn humanize_error(err: &WandelwerkError) -> HumanError {
    let (message, suggestion): (&str, String) = match err {
        WandelwerkError::InvalidRequest(detail) => (
            "Something is missing from the request.",
            format!("Check the chosen file, output format and page size, then try again. ({detail})"),
        ),
        WandelwerkError::UnsupportedEncoding(detail) => (
            "We can't produce that output format.",
            format!("Choose JPEG, PNG, WebP or PDF as the output. (Requested: {detail})"),
        ),
        WandelwerkError::UnsupportedSourceFormat(detail) => (
            "This type of file isn't supported.",
            format!("Upload a Word (.docx), OpenDocument (.odt), plain text or image file. ({detail})"),
        ),
        WandelwerkError::DecodeError(_) => (
            "There's a problem with this image.",
            "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
        ),
        WandelwerkError::MalformedDocument(_) => (
            "There's a problem with this PDF file.",
            "The file may be damaged. Try opening it on a computer first to check it works, or try a different file.".into(),
        ),
        WandelwerkError::InvalidImage(_) => (
            "The picture you attached couldn't be read.",
            "Attach a JPEG or PNG image, or leave the picture out.".into(),
        ),
        WandelwerkError::ConversionTimeout { .. } => (
            "The conversion took too long.",
            "Try a smaller or simpler file.".into(),
        ),
        WandelwerkError::ConversionFailed(_) => (
            "The conversion failed unexpectedly.",
            "Try again. If this keeps happening, please report it.".into(),
        ),
        WandelwerkError::NotFound(_) => (
            "That file is no longer available.",
            "Converted files are removed shortly after they are ready. Convert the file again.".into(),
        ),
        WandelwerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::StorageFull => (
            "The server ran out of space.",
            "Try again in a few minutes.".into(),
        ),
        WandelwerkError::Io(_) => (
            "There was a problem reading or writing a file.",
            "Try again. If this keeps happening, please report it.".into(),
        ),
        WandelwerkError::Serialization(_) => (
            "The server had an internal data problem.",
            "Try again. If this keeps happening, please report it.".into(),
        ),
    };

    HumanError {
        kind: error_kind(err),
        message: message.into(),
        suggestion,
        class: classify(err),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::types::ArtifactId;

    #[test]
    fn bad_bytes_are_client_errors() {
        for err in [
            WandelwerkError::DecodeError("truncated".into()),
            WandelwerkError::MalformedDocument("no header".into()),
            WandelwerkError::InvalidImage("garbage".into()),
            WandelwerkError::InvalidRequest("missing".into()),
        ] {
            assert_eq!(classify(&err), ErrorClass::ClientInput, "{err}");
        }
    }

    #[test]
    fn timeout_has_its_own_class() {
        let err = WandelwerkError::ConversionTimeout {
            operation: "document conversion",
            limit: Duration::from_secs(30),
        };
        let human = humanize_error(&err);
        assert_eq!(human.class, ErrorClass::Timeout);
        assert_eq!(human.kind, "ConversionTimeout");
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn converter_failure_is_server_side() {
        let human = humanize_error(&WandelwerkError::ConversionFailed("encoder panicked".into()));
        assert_eq!(human.class, ErrorClass::Server);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let human = humanize_error(&WandelwerkError::NotFound(ArtifactId::new()));
        assert_eq!(human.class, ErrorClass::NotFound);
        assert_eq!(human.kind, "NotFound");
    }
}
