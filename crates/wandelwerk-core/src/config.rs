// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WandelwerkError;
use crate::types::PageSize;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "WANDELWERK_";

/// Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding uploaded and generated artifacts.
    pub storage_dir: PathBuf,
    /// TCP port for the HTTP adapter.
    pub listen_port: u16,
    /// Delay between serving an artifact and deleting it.
    pub cleanup_delay_secs: u64,
    /// Wall-clock budget for office-document-to-PDF conversion.
    pub document_timeout_secs: u64,
    /// Wall-clock budget for image re-encoding.
    pub image_timeout_secs: u64,
    /// Wall-clock budget for reconstruction and text extraction.
    pub reconstruct_timeout_secs: u64,
    /// Largest accepted upload.
    pub max_upload_bytes: usize,
    /// Page size used when a reconstruct request names none.
    pub default_page_size: PageSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("convert"),
            listen_port: 6100,
            cleanup_delay_secs: 10,
            document_timeout_secs: 30,
            image_timeout_secs: 30,
            reconstruct_timeout_secs: 30,
            max_upload_bytes: 64 * 1024 * 1024,
            default_page_size: PageSize::A4,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `WANDELWERK_*` process environment variables.
    pub fn from_env() -> Result<Self, WandelwerkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `WANDELWERK_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WandelwerkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(dir) = get("STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("LISTEN_PORT") {
            config.listen_port = parse_var("LISTEN_PORT", &raw)?;
        }
        if let Some(raw) = get("CLEANUP_DELAY_SECS") {
            config.cleanup_delay_secs = parse_var("CLEANUP_DELAY_SECS", &raw)?;
        }
        if let Some(raw) = get("DOCUMENT_TIMEOUT_SECS") {
            config.document_timeout_secs = parse_var("DOCUMENT_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("IMAGE_TIMEOUT_SECS") {
            config.image_timeout_secs = parse_var("IMAGE_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("RECONSTRUCT_TIMEOUT_SECS") {
            config.reconstruct_timeout_secs = parse_var("RECONSTRUCT_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", &raw)?;
        }
        if let Some(raw) = get("DEFAULT_PAGE_SIZE") {
            config.default_page_size = raw.parse()?;
        }

        Ok(config)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn reconstruct_timeout(&self) -> Duration {
        Duration::from_secs(self.reconstruct_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, WandelwerkError> {
    raw.trim().parse().map_err(|_| {
        WandelwerkError::InvalidRequest(format!("{ENV_PREFIX}{name}: cannot parse '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("WANDELWERK_LISTEN_PORT", "8080"),
            ("WANDELWERK_CLEANUP_DELAY_SECS", "60"),
            ("WANDELWERK_DEFAULT_PAGE_SIZE", "letter"),
        ]
        .into_iter()
        .collect();

        let config =
            AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.cleanup_delay(), Duration::from_secs(60));
        assert_eq!(config.default_page_size, PageSize::Letter);
        assert_eq!(config.document_timeout_secs, 30);
    }

    #[test]
    fn bad_value_names_the_variable() {
        let err = AppConfig::from_lookup(|key| {
            (key == "WANDELWERK_IMAGE_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("WANDELWERK_IMAGE_TIMEOUT_SECS"));
    }
}
