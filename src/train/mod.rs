//! Training-loop hooks
//!
//! This module does not run training. It provides the hooks a training loop
//! calls into:
//! - [`TrainerCallback`] and the [`CallbackManager`] that dispatches to them
//! - [`CheckpointCallback`], which saves the model after every epoch
//! - [`EpochEndFn`], for registering a plain closure instead of a type
//!
//! # Example
//!
//! ```no_run
//! use cuaderno::io::{Model, ModelMetadata};
//! use cuaderno::train::{CallbackContext, CallbackManager, CheckpointCallback};
//! use cuaderno::Tensor;
//!
//! let model = Model::new(
//!     ModelMetadata::new("toy", "linear"),
//!     vec![("w".to_string(), Tensor::zeros(4, true))],
//! );
//!
//! let mut callbacks = CallbackManager::new();
//! callbacks.add(CheckpointCallback::new("weights.{}.json"));
//!
//! for epoch in 0..3 {
//!     // ... update `model` ...
//!     callbacks.on_epoch_end(&CallbackContext::new(epoch, &model))?;
//! }
//! # Ok::<(), cuaderno::Error>(())
//! ```

pub mod callback;
mod template;

pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, CheckpointCallback, EpochEndFn, Metrics,
    TrainerCallback,
};
pub use template::{PathTemplate, TemplateError};
