//! YAML schema definitions for a notebook session

use crate::download::{DownloadOptions, Downloader};
use crate::io::{ModelFormat, SaveConfig};
use crate::train::CheckpointCallback;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Complete notebook session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookSpec {
    /// Per-epoch checkpointing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<CheckpointSpec>,

    /// Download tuning
    #[serde(default)]
    pub download: DownloadSpec,
}

/// Checkpoint callback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSpec {
    /// Path template with one `{}` slot for the epoch
    pub path_template: String,

    /// Format for paths whose extension names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ModelFormat>,

    /// Pretty-print text formats
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl CheckpointSpec {
    /// Fallback save config for this spec
    pub fn save_config(&self) -> SaveConfig {
        SaveConfig::new(self.format.unwrap_or(ModelFormat::Json)).with_pretty(self.pretty)
    }

    /// Build the callback described by this spec
    pub fn build(&self) -> CheckpointCallback {
        CheckpointCallback::new(self.path_template.as_str()).with_config(self.save_config())
    }
}

/// Download configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSpec {
    /// Bytes per read from the response
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Buffered writer capacity
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Show a progress bar
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for DownloadSpec {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            buffer_size: default_buffer_size(),
            progress: default_progress(),
        }
    }
}

impl DownloadSpec {
    /// Downloader options described by this spec
    pub fn options(&self) -> DownloadOptions {
        DownloadOptions {
            chunk_size: self.chunk_size,
            buffer_size: self.buffer_size,
            progress: self.progress,
        }
    }

    /// Build a downloader from this spec
    pub fn build(&self) -> Result<Downloader> {
        Downloader::with_options(self.options())
    }
}

fn default_pretty() -> bool {
    true
}

fn default_chunk_size() -> usize {
    DownloadOptions::default().chunk_size
}

fn default_buffer_size() -> usize {
    DownloadOptions::default().buffer_size
}

fn default_progress() -> bool {
    true
}
