use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::project::ProjectResult;
use crate::util::write_atomic;

/// How project files are written.  
/// 專案檔案的寫入設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default = "default_true")]
    pub pretty_json: bool,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

fn default_true() -> bool {
    true
}

fn default_file_suffix() -> String {
    ".json".to_string()
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            pretty_json: true,
            file_suffix: default_file_suffix(),
        }
    }
}

impl ProjectSettings {
    /// Reads settings from `path`; a missing file yields the defaults.  
    /// 從檔案載入設定；檔案不存在時回傳預設值。
    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let mut settings: Self = match fs::read_to_string(path.as_ref()) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        let payload = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), payload.as_bytes())?;
        Ok(())
    }

    /// File name holding a model of the given type, e.g. `samplemodel.json`.
    pub fn model_file_name(&self, model_type: &str) -> String {
        format!("{}{}", model_type.to_lowercase(), self.file_suffix)
    }

    fn sanitize(&mut self) {
        if self.file_suffix.is_empty() {
            self.file_suffix = default_file_suffix();
        }
    }
}
