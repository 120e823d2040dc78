// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared handler state.

use wandelwerk_core::AppConfig;
use wandelwerk_core::error::Result;
use wandelwerk_service::{ArtifactStore, ConversionDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: ConversionDispatcher,
}

impl AppState {
    /// Open the artifact store named by `config` and build the dispatcher.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = ArtifactStore::open(&config.storage_dir)?;
        Ok(Self {
            dispatcher: ConversionDispatcher::new(store, config),
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.dispatcher.config().max_upload_bytes
    }
}
