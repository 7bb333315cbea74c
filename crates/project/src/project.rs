use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use mvvm_model::serialization::JsonModelConverter;
use mvvm_model::{model_to_json_string, ItemTree, ModelError};
use serde_json::Value;
use thiserror::Error;

use crate::models::ApplicationModels;
use crate::settings::ProjectSettings;
use crate::util::write_atomic;

/// Errors raised while creating, saving or loading projects.  
/// 建立、儲存或載入專案時可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("current project has unsaved modifications")]
    Modified,
    #[error("current project is not bound to a directory")]
    NoProjectDir,
    #[error("project directory {0} does not exist")]
    DirectoryMissing(PathBuf),
    #[error("project IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid project content: {0}")]
    Model(#[from] ModelError),
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

/// A directory binding plus the model revisions last written to or read from it.
/// 專案：綁定的目錄，以及最近一次儲存或載入時的模型版本快照。
#[derive(Debug, Clone)]
pub struct Project {
    dir: Option<PathBuf>,
    saved_revisions: Vec<u64>,
    settings: ProjectSettings,
}

impl Project {
    /// Untitled project treating the current state of `models` as unmodified.
    pub fn untitled<M: ApplicationModels>(models: &M, settings: ProjectSettings) -> Self {
        Self {
            dir: None,
            saved_revisions: models.revisions(),
            settings,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn is_modified<M: ApplicationModels>(&self, models: &M) -> bool {
        models.revisions() != self.saved_revisions
    }

    /// Path of the file storing models of `model_type` inside `dir`.
    pub fn model_path(&self, dir: &Path, model_type: &str) -> PathBuf {
        dir.join(self.settings.model_file_name(model_type))
    }

    /// Writes every persistent model into `dir`, then binds the project to it.  
    /// 將所有模型寫入目錄，成功後綁定該目錄。
    pub fn save<M: ApplicationModels>(&mut self, dir: &Path, models: &M) -> ProjectResult<()> {
        ensure_dir(dir)?;
        for model in models.persistent_models() {
            let path = self.model_path(dir, model.model_type());
            let payload = model_to_json_string(model, self.settings.pretty_json);
            write_atomic(&path, payload.as_bytes())?;
        }
        self.dir = Some(dir.to_path_buf());
        self.saved_revisions = models.revisions();
        info!("project saved to {}", dir.display());
        Ok(())
    }

    /// Reads every persistent model from `dir`. All files are parsed and converted before any
    /// model is touched, so a failure leaves every model unchanged.
    /// 從目錄載入所有模型；全部解析成功後才套用，失敗時模型保持原狀。
    pub fn load<M: ApplicationModels>(
        &mut self,
        dir: &Path,
        models: &mut M,
    ) -> ProjectResult<()> {
        ensure_dir(dir)?;
        let converter = JsonModelConverter::new();
        let mut pending: Vec<Vec<ItemTree>> = Vec::new();
        for model in models.persistent_models() {
            let path = self.model_path(dir, model.model_type());
            let contents = fs::read_to_string(&path)?;
            let json: Value = serde_json::from_str(&contents)?;
            pending.push(converter.items_from_json(&json, model)?);
        }
        for (model, items) in models.persistent_models_mut().into_iter().zip(pending) {
            model.reset_items(items)?;
        }
        self.dir = Some(dir.to_path_buf());
        self.saved_revisions = models.revisions();
        info!("project loaded from {}", dir.display());
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> ProjectResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ProjectError::DirectoryMissing(dir.to_path_buf()))
    }
}
