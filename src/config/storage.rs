use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the token slot configuration:
/// - enabled: if false, persistence is unavailable (NoSlot).
/// - backend: where the token lives (file, memory).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StorageConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: Some(StorageBackend::File(FileSlotConfig::default())),
        }
    }
}

/// The existing slot backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "file")]
    File(FileSlotConfig),
    #[serde(rename = "memory")]
    Memory,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileSlotConfig {
    #[serde(default = "default_token_path")]
    pub path: String,
}

impl Default for FileSlotConfig {
    fn default() -> Self {
        Self {
            path: default_token_path(),
        }
    }
}

fn default_token_path() -> String {
    ".savolalab/token".to_string()
}
