//! Declarative YAML configuration
//!
//! A notebook session can be described in YAML instead of being wired by hand.
//!
//! # Example
//!
//! ```yaml
//! checkpoint:
//!   path_template: "checkpoints/epoch_{:03}.safetensors"
//!   pretty: false
//!
//! download:
//!   chunk_size: 1048576
//!   buffer_size: 16777216
//!   progress: true
//! ```

mod cli;
mod load;
mod schema;
mod validate;


pub use cli::{
    parse_args, CheckpointPathArgs, Cli, Command, DownloadArgs, InfoArgs, ValidateArgs,
};
pub use load::{load_config, parse_config};
pub use schema::{CheckpointSpec, DownloadSpec, NotebookSpec};
pub use validate::{validate_config, ValidationError};
