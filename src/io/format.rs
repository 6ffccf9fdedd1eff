//! Serialization format definitions

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported model serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// JSON format (human-readable, larger file size)
    Json,

    /// YAML format (human-readable)
    Yaml,

    /// SafeTensors format (HuggingFace compatible, efficient binary)
    SafeTensors,
}

impl ModelFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            ModelFormat::Json => "json",
            ModelFormat::Yaml => "yaml",
            ModelFormat::SafeTensors => "safetensors",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ModelFormat::Json),
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            "safetensors" => Some(ModelFormat::SafeTensors),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration for saving models
#[derive(Debug, Clone, PartialEq)]
pub struct SaveConfig {
    /// Serialization format
    pub format: ModelFormat,

    /// Whether to pretty-print (text formats only)
    pub pretty: bool,
}

impl SaveConfig {
    /// Create new save config with format
    pub fn new(format: ModelFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    /// Pick the format named by the path's extension, else `fallback`
    ///
    /// Checkpoint templates often use neutral extensions like `.bin`; those
    /// land on the fallback.
    pub fn for_path(path: &Path, fallback: &SaveConfig) -> Self {
        match ModelFormat::from_path(path) {
            Some(format) => Self {
                format,
                pretty: fallback.pretty,
            },
            None => fallback.clone(),
        }
    }

    /// Enable/disable pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self::new(ModelFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension() {
        assert_eq!(ModelFormat::Json.extension(), "json");
        assert_eq!(ModelFormat::Yaml.extension(), "yaml");
        assert_eq!(ModelFormat::SafeTensors.extension(), "safetensors");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_extension("json"), Some(ModelFormat::Json));
        assert_eq!(ModelFormat::from_extension("JSON"), Some(ModelFormat::Json));
        assert_eq!(ModelFormat::from_extension("yml"), Some(ModelFormat::Yaml));
        assert_eq!(
            ModelFormat::from_extension("SAFETENSORS"),
            Some(ModelFormat::SafeTensors)
        );
        assert_eq!(ModelFormat::from_extension("bin"), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ModelFormat::from_path(Path::new("ckpt_3.yaml")),
            Some(ModelFormat::Yaml)
        );
        assert_eq!(ModelFormat::from_path(Path::new("ckpt_3.bin")), None);
        assert_eq!(ModelFormat::from_path(Path::new("ckpt_3")), None);
    }

    #[test]
    fn test_format_serde_names() {
        let yaml: ModelFormat = serde_yaml::from_str("safetensors").unwrap();
        assert_eq!(yaml, ModelFormat::SafeTensors);
        assert_eq!(serde_json::to_string(&ModelFormat::Json).unwrap(), "\"json\"");
    }

    #[test]
    fn test_save_config_for_path_uses_extension() {
        let fallback = SaveConfig::new(ModelFormat::Json).with_pretty(false);
        let config = SaveConfig::for_path(Path::new("w.safetensors"), &fallback);
        assert_eq!(config.format, ModelFormat::SafeTensors);
        assert!(!config.pretty);
    }

    #[test]
    fn test_save_config_for_path_falls_back() {
        let fallback = SaveConfig::new(ModelFormat::Yaml);
        let config = SaveConfig::for_path(Path::new("weights.3.bin"), &fallback);
        assert_eq!(config, fallback);
    }

    #[test]
    fn test_save_config_default() {
        let config = SaveConfig::default();
        assert_eq!(config.format, ModelFormat::Json);
        assert!(config.pretty);
    }
}
