// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Append-only, human-readable log of mutating actions.
//!
//! This is a convenience trail for whoever runs the server, separate from the
//! structured tracing output. Write failures are logged and swallowed.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Action log sink. A disabled log drops every entry.
#[derive(Clone, Debug, Default)]
pub struct ActionLog {
    path: Option<PathBuf>,
}

impl ActionLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Append one timestamped line. Never fails the caller.
    pub async fn record(&self, action: &str) {
        let Some(path) = &self.path else {
            return;
        };

        let line = format!(
            "{} {}\n",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            action
        );

        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write action log");
        }
    }
}
