//! Model I/O - Loading and saving models
//!
//! This is the serialization routine the checkpoint callback delegates to.
//! The byte layout of each format is owned here, not by callers.

mod format;
mod load;
mod model;
mod save;


pub use format::{ModelFormat, SaveConfig};
pub use load::{load_model, load_model_as};
pub use model::{Model, ModelMetadata, ModelState, ParameterInfo};
pub use save::save_model;
