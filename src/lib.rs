//! # Cuaderno: notebook helpers for model training
//!
//! Small utilities for training models from an interactive notebook.
//!
//! ## Architecture
//!
//! - **train**: Epoch callbacks, including the per-epoch checkpoint writer
//! - **io**: Model container plus saving and loading (JSON, YAML, SafeTensors)
//! - **download**: Streaming file download with a progress bar
//! - **session**: Explicit backend session context and reset
//! - **display**: Inline frame rendering for notebook front-ends
//! - **config**: Declarative YAML configuration and CLI arguments

pub mod config;
pub mod display;
pub mod download;
pub mod io;
pub mod session;
pub mod tensor;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use error::{Error, Result};
pub use tensor::Tensor;
