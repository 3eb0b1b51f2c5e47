//! Power status line
//!
//! Drives the dim/bright power indicator through a PWM duty cycle file. When
//! no output is configured the duty changes are only logged.

use std::path::PathBuf;

use crate::models::StatusLineConfig;

pub struct StatusLine {
    output: Option<PathBuf>,
}

impl StatusLine {
    pub fn new(config: &StatusLineConfig) -> Self {
        Self {
            output: config.output.clone(),
        }
    }

    /// Set the indicator duty cycle
    ///
    /// Write failures are logged and swallowed, the indicator is best-effort.
    pub async fn set_duty(&self, duty: u8) {
        match &self.output {
            Some(path) => {
                debug!(duty = %duty, path = %path.display(), "setting status line duty");

                if let Err(error) = tokio::fs::write(path, format!("{}\n", duty)).await {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "error writing status line duty"
                    );
                }
            }
            None => {
                debug!(duty = %duty, "status line not configured");
            }
        }
    }
}
