//! Model saving functionality

use super::format::{ModelFormat, SaveConfig};
use super::model::Model;
use crate::{Error, Result};
use safetensors::tensor::{Dtype, TensorView};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save a model to a file
///
/// Any existing file at `path` is truncated and overwritten. The parent
/// directory is not created.
///
/// # Example
///
/// ```no_run
/// use cuaderno::io::{Model, ModelMetadata, save_model, SaveConfig, ModelFormat};
/// use cuaderno::Tensor;
///
/// let params = vec![
///     ("weight".to_string(), Tensor::from_vec(vec![1.0, 2.0], true)),
/// ];
/// let model = Model::new(ModelMetadata::new("my-model", "linear"), params);
/// let config = SaveConfig::new(ModelFormat::Json);
///
/// save_model(&model, "model.json", &config).unwrap();
/// ```
pub fn save_model(model: &Model, path: impl AsRef<Path>, config: &SaveConfig) -> Result<()> {
    let path = path.as_ref();

    let data = match config.format {
        ModelFormat::SafeTensors => return save_safetensors(model, path),
        ModelFormat::Json => {
            reject_non_finite(model)?;
            let state = model.to_state();
            if config.pretty {
                serde_json::to_string_pretty(&state)
            } else {
                serde_json::to_string(&state)
            }
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?
        }
        ModelFormat::Yaml => serde_yaml::to_string(&model.to_state())
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };

    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Serialization(format!("SafeTensors metadata failed: {e}")))
}

/// JSON has no NaN or infinity; serde_json would write them as `null`
fn reject_non_finite(model: &Model) -> Result<()> {
    for (name, tensor) in &model.parameters {
        if let Some(value) = tensor.data().iter().find(|v| !v.is_finite()) {
            return Err(Error::Serialization(format!(
                "Parameter '{name}' holds {value}, which JSON cannot represent; \
                 save as YAML or SafeTensors instead"
            )));
        }
    }
    Ok(())
}

/// Save model in SafeTensors format (HuggingFace compatible)
fn save_safetensors(model: &Model, path: &Path) -> Result<()> {
    let tensor_data: Vec<(&str, Vec<u8>, Vec<usize>)> = model
        .parameters
        .iter()
        .map(|(name, tensor)| {
            let values = tensor.to_vec();
            let bytes: Vec<u8> = bytemuck::cast_slice(&values).to_vec();
            (name.as_str(), bytes, vec![tensor.len()])
        })
        .collect();

    let views = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            TensorView::new(Dtype::F32, shape.clone(), bytes)
                .map(|view| (*name, view))
                .map_err(|e| Error::Serialization(format!("Invalid tensor '{name}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut metadata = HashMap::new();
    metadata.insert("name".to_string(), model.metadata.name.clone());
    metadata.insert(
        "architecture".to_string(),
        model.metadata.architecture.clone(),
    );
    metadata.insert("version".to_string(), model.metadata.version.clone());

    // Tensor order and grad flags are not part of the SafeTensors layout
    metadata.insert("parameters".to_string(), to_json(&model.parameter_infos())?);
    if !model.metadata.custom.is_empty() {
        metadata.insert("custom".to_string(), to_json(&model.metadata.custom)?);
    }

    let bytes = safetensors::serialize(views, Some(metadata))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;

    std::fs::write(path, bytes)?;
    Ok(())
}
