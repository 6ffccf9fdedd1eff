//! Configuration validation

use super::schema::NotebookSpec;
use crate::train::{PathTemplate, TemplateError};

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Checkpoint path template is empty")]
    EmptyTemplate,

    #[error("Invalid checkpoint path template '{template}': {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: TemplateError,
    },

    #[error("Invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    #[error("Invalid buffer size: {buffer} (must be >= chunk size {chunk})")]
    InvalidBufferSize { buffer: usize, chunk: usize },
}

/// Validate a notebook configuration
///
/// The checkpoint callback itself defers template errors to save time; a
/// config file is checked up front so mistakes surface before training starts.
pub fn validate_config(spec: &NotebookSpec) -> Result<(), ValidationError> {
    if let Some(checkpoint) = &spec.checkpoint {
        if checkpoint.path_template.trim().is_empty() {
            return Err(ValidationError::EmptyTemplate);
        }
        PathTemplate::new(checkpoint.path_template.as_str())
            .validate()
            .map_err(|source| ValidationError::InvalidTemplate {
                template: checkpoint.path_template.clone(),
                source,
            })?;
    }

    let download = &spec.download;
    if download.chunk_size == 0 {
        return Err(ValidationError::InvalidChunkSize(download.chunk_size));
    }
    if download.buffer_size < download.chunk_size {
        return Err(ValidationError::InvalidBufferSize {
            buffer: download.buffer_size,
            chunk: download.chunk_size,
        });
    }

    Ok(())
}
