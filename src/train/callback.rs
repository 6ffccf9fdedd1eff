//! Callback system for training events
//!
//! A training loop owns the model and drives these hooks:
//! - `on_train_begin` / `on_train_end`
//! - `on_epoch_begin` / `on_epoch_end`
//!
//! Each hook sees the model through a shared borrow that lives only for the
//! duration of the call. Every hook returns a `Result`; errors are never
//! swallowed and reach the loop, which decides whether to keep training.
//!
//! # Example
//!
//! ```rust
//! use cuaderno::train::{CallbackAction, CallbackContext, TrainerCallback};
//!
//! struct PrintCallback;
//!
//! impl TrainerCallback for PrintCallback {
//!     fn on_epoch_end(&mut self, ctx: &CallbackContext<'_>) -> cuaderno::Result<CallbackAction> {
//!         println!("Epoch {} finished ({} params)", ctx.epoch, ctx.model.num_parameters());
//!         Ok(CallbackAction::Continue)
//!     }
//! }
//! ```

use super::template::PathTemplate;
use crate::io::{save_model, Model, SaveConfig};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Named scalar metrics reported for an epoch (e.g. `loss`, `val_loss`)
pub type Metrics = BTreeMap<String, f64>;

/// Context passed to callbacks for a single event
#[derive(Clone, Copy, Debug)]
pub struct CallbackContext<'a> {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Metrics for the epoch, when the loop reports any
    pub metrics: Option<&'a Metrics>,
    /// The model being trained
    pub model: &'a Model,
}

impl<'a> CallbackContext<'a> {
    /// Context for `epoch` without metrics
    pub fn new(epoch: usize, model: &'a Model) -> Self {
        Self {
            epoch,
            metrics: None,
            model,
        }
    }

    /// Attach epoch metrics
    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Look up a single metric
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.and_then(|m| m.get(name).copied())
    }
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Ask the loop to stop training
    Stop,
}

/// Trait for training callbacks
///
/// All methods have default no-op implementations, so you only need to
/// implement the events you care about.
pub trait TrainerCallback: Send {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called after each epoch
    fn on_epoch_end(&mut self, _ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Get callback name for logging
    fn name(&self) -> &str {
        "TrainerCallback"
    }
}

// =============================================================================
// Checkpoint Callback
// =============================================================================

/// Writes the model to a per-epoch path at the end of every epoch
///
/// The path is the template formatted with the epoch index. An existing file
/// at that path is overwritten. After a successful write the line
/// `Model saved in <path>` goes to the output sink (stdout by default).
///
/// The serialization format follows the path's extension (`.json`, `.yaml`,
/// `.safetensors`); other extensions use the configured [`SaveConfig`].
///
/// # Example
///
/// ```no_run
/// use cuaderno::train::CheckpointCallback;
///
/// let checkpoints = CheckpointCallback::new("weights.{}.json");
/// assert_eq!(
///     checkpoints.checkpoint_path(4).unwrap(),
///     std::path::PathBuf::from("weights.4.json"),
/// );
/// ```
pub struct CheckpointCallback {
    template: PathTemplate,
    save_config: SaveConfig,
    out: Box<dyn Write + Send>,
}

impl CheckpointCallback {
    /// Create a checkpoint callback writing to `template`
    ///
    /// The template is not checked here; a malformed one fails on first save.
    pub fn new(template: impl Into<PathTemplate>) -> Self {
        Self {
            template: template.into(),
            save_config: SaveConfig::default(),
            out: Box::new(std::io::stdout()),
        }
    }

    /// Save config used when the path's extension names no format
    pub fn with_config(mut self, config: SaveConfig) -> Self {
        self.save_config = config;
        self
    }

    /// Redirect the save notification
    pub fn with_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// The path template
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Get checkpoint path for epoch
    pub fn checkpoint_path(&self, epoch: usize) -> Result<PathBuf> {
        Ok(self.template.format(epoch)?)
    }

    /// Save `model` as the checkpoint for `epoch` and return the path written
    pub fn save(&mut self, epoch: usize, model: &Model) -> Result<PathBuf> {
        let path = self.checkpoint_path(epoch)?;
        tracing::debug!(epoch, path = %path.display(), "writing checkpoint");

        let config = SaveConfig::for_path(&path, &self.save_config);
        save_model(model, &path, &config)?;

        writeln!(self.out, "Model saved in {}", path.display())?;
        self.out.flush()?;
        tracing::info!(epoch, path = %path.display(), format = ?config.format, "checkpoint saved");

        Ok(path)
    }
}

impl fmt::Debug for CheckpointCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointCallback")
            .field("template", &self.template)
            .field("save_config", &self.save_config)
            .finish_non_exhaustive()
    }
}

impl TrainerCallback for CheckpointCallback {
    fn on_epoch_end(&mut self, ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        self.save(ctx.epoch, ctx.model)?;
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &str {
        "CheckpointCallback"
    }
}

// =============================================================================
// Closure Callback
// =============================================================================

/// Adapts a plain `(epoch, &Model) -> Result<()>` closure into an epoch-end hook
pub struct EpochEndFn<F> {
    name: String,
    f: F,
}

impl<F> EpochEndFn<F>
where
    F: FnMut(usize, &Model) -> Result<()> + Send,
{
    /// Wrap `f` under the given name
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> TrainerCallback for EpochEndFn<F>
where
    F: FnMut(usize, &Model) -> Result<()> + Send,
{
    fn on_epoch_end(&mut self, ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        (self.f)(ctx.epoch, ctx.model)?;
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Callback Manager
// =============================================================================

/// Manages multiple callbacks and dispatches events in registration order
///
/// Dispatch is fail-fast: the first callback error stops the event and is
/// returned as [`Error::Callback`], naming the callback that raised it.
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Register a closure to run at the end of every epoch
    pub fn on_epoch_end_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnMut(usize, &Model) -> Result<()> + Send + 'static,
    {
        self.add(EpochEndFn::new(name, f));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of the registered callbacks, in order
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        self.dispatch(|cb| cb.on_train_begin(ctx))
    }

    /// Fire epoch begin event
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        self.dispatch(|cb| cb.on_epoch_begin(ctx))
    }

    /// Fire epoch end event
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext<'_>) -> Result<CallbackAction> {
        self.dispatch(|cb| cb.on_epoch_end(ctx))
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &CallbackContext<'_>) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx).map_err(|e| wrap(&**cb, e))?;
        }
        Ok(())
    }

    /// Every callback sees the event even after one asks to stop; an error
    /// cuts the event short.
    fn dispatch<H>(&mut self, mut hook: H) -> Result<CallbackAction>
    where
        H: FnMut(&mut dyn TrainerCallback) -> Result<CallbackAction>,
    {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            if hook(&mut **cb).map_err(|e| wrap(&**cb, e))? == CallbackAction::Stop {
                action = CallbackAction::Stop;
            }
        }
        Ok(action)
    }
}

fn wrap(cb: &dyn TrainerCallback, source: Error) -> Error {
    Error::Callback {
        name: cb.name().to_string(),
        source: Box::new(source),
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================
