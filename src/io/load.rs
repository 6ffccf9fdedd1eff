//! Model loading functionality

use super::format::ModelFormat;
use super::model::{Model, ModelMetadata, ModelState, ParameterInfo};
use crate::{Error, Result, Tensor};
use std::collections::BTreeMap;
use std::path::Path;

/// Load a model from a file
///
/// The format is detected from the file extension.
///
/// # Example
///
/// ```no_run
/// use cuaderno::io::load_model;
///
/// let model = load_model("model.json").unwrap();
/// println!("Loaded model: {}", model.metadata.name);
/// ```
pub fn load_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Serialization("File has no extension".to_string()))?;

    let format = ModelFormat::from_extension(ext)
        .ok_or_else(|| Error::Serialization(format!("Unsupported file extension: {ext}")))?;

    load_model_as(path, format)
}

/// Load a model from a file in an explicit format
///
/// Use this for checkpoints whose extension does not name the format.
pub fn load_model_as(path: impl AsRef<Path>, format: ModelFormat) -> Result<Model> {
    let path = path.as_ref();

    let state: ModelState = match format {
        ModelFormat::SafeTensors => return load_safetensors(path),
        ModelFormat::Json => serde_json::from_str(&std::fs::read_to_string(path)?)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::from_str(&std::fs::read_to_string(path)?)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };

    Model::from_state(state)
}

/// Load model from SafeTensors format (HuggingFace compatible)
///
/// Files written by [`save_model`](super::save_model) carry the parameter
/// order, grad flags, and custom metadata in `__metadata__`. Foreign files
/// lack them and load sorted by name with `requires_grad` off.
fn load_safetensors(path: &Path) -> Result<Model> {
    let data = std::fs::read(path)?;

    let (_, header) = safetensors::SafeTensors::read_metadata(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;

    let stored = header.metadata();
    let get = |key: &str| stored.as_ref().and_then(|m| m.get(key));
    let lookup = |key: &str| get(key).cloned().unwrap_or_else(|| "unknown".to_string());

    let mut metadata = ModelMetadata::new(lookup("name"), lookup("architecture"));
    if let Some(version) = get("version") {
        metadata.version = version.clone();
    }
    if let Some(custom) = get("custom") {
        metadata.custom = serde_json::from_str(custom)
            .map_err(|e| Error::Serialization(format!("Invalid custom metadata: {e}")))?;
    }
    let declared: Option<Vec<ParameterInfo>> = get("parameters")
        .map(|json| serde_json::from_str(json))
        .transpose()
        .map_err(|e| Error::Serialization(format!("Invalid parameter metadata: {e}")))?;

    let tensors = safetensors::SafeTensors::deserialize(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;

    let mut values = BTreeMap::new();
    for (name, view) in tensors.tensors() {
        if view.dtype() != safetensors::tensor::Dtype::F32 {
            return Err(Error::Serialization(format!(
                "Tensor '{name}' has unsupported dtype {:?}",
                view.dtype()
            )));
        }
        let data: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        values.insert(name, data);
    }

    let parameters = match declared {
        Some(infos) => {
            let mut parameters = Vec::with_capacity(infos.len());
            for info in infos {
                let data = values.remove(&info.name).ok_or_else(|| {
                    Error::Serialization(format!("Tensor '{}' listed but missing", info.name))
                })?;
                parameters.push((info.name, Tensor::from_vec(data, info.requires_grad)));
            }
            if let Some(extra) = values.keys().next() {
                return Err(Error::Serialization(format!(
                    "Tensor '{extra}' present but not listed in metadata"
                )));
            }
            parameters
        }
        None => values
            .into_iter()
            .map(|(name, data)| (name, Tensor::from_vec(data, false)))
            .collect(),
    };

    Ok(Model::new(metadata, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{save_model, SaveConfig};
    use tempfile::tempdir;

    fn sample() -> Model {
        Model::new(
            ModelMetadata::new("test-model", "linear"),
            vec![
                ("weight".to_string(), Tensor::from_vec(vec![1.0, 2.0, 3.0], true)),
                ("bias".to_string(), Tensor::from_vec(vec![0.1], false)),
            ],
        )
    }

    #[test]
    fn test_load_model_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.json");
        save_model(&sample(), &path, &SaveConfig::new(ModelFormat::Json)).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_model_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.yml");
        save_model(&sample(), &path, &SaveConfig::new(ModelFormat::Yaml)).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_model_safetensors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.safetensors");
        let model = Model::new(
            sample().metadata.with_custom("hidden", serde_json::json!(16)),
            sample().parameters,
        );
        save_model(&model, &path, &SaveConfig::new(ModelFormat::SafeTensors)).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, model);
        assert!(loaded.get_parameter("weight").unwrap().requires_grad());
        assert!(!loaded.get_parameter("bias").unwrap().requires_grad());
    }

    #[test]
    fn test_load_foreign_safetensors_sorts_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foreign.safetensors");
        let z = 1.0f32.to_le_bytes();
        let a = 2.0f32.to_le_bytes();
        let views = vec![
            (
                "z",
                safetensors::tensor::TensorView::new(safetensors::tensor::Dtype::F32, vec![1], &z)
                    .unwrap(),
            ),
            (
                "a",
                safetensors::tensor::TensorView::new(safetensors::tensor::Dtype::F32, vec![1], &a)
                    .unwrap(),
            ),
        ];
        std::fs::write(&path, safetensors::serialize(views, None).unwrap()).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.metadata.name, "unknown");
        let names: Vec<&str> = loaded.parameters.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "z"]);
        assert!(!loaded.get_parameter("a").unwrap().requires_grad());
    }

    #[test]
    fn test_load_model_as_for_neutral_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ckpt_3.bin");
        save_model(&sample(), &path, &SaveConfig::default()).unwrap();

        assert!(load_model(&path).is_err());
        let loaded = load_model_as(&path, ModelFormat::Json).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_model_no_extension() {
        let err = load_model("model").unwrap_err();
        assert!(err.to_string().contains("no extension"));
    }

    #[test]
    fn test_load_model_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_model(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_model_corrupt_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(err.to_string().contains("JSON deserialization failed"));
    }
}
