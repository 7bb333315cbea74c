use std::path::Path;

use log::{info, warn};

use crate::models::ApplicationModels;
use crate::project::{Project, ProjectError, ProjectResult};
use crate::settings::ProjectSettings;
use crate::title::project_title;

/// Owns the application models and the current project bound to them.
///
/// The current project is untitled (no directory), saved, or modified. Creating or opening a
/// project refuses to discard unsaved changes; closing does not check.  
/// 管理應用程式模型與目前專案；建立或開啟專案時不會捨棄未儲存的變更，關閉則不檢查。
#[derive(Debug)]
pub struct ProjectManager<M> {
    models: M,
    project: Project,
}

impl<M: ApplicationModels> ProjectManager<M> {
    pub fn new(models: M) -> Self {
        Self::with_settings(models, ProjectSettings::default())
    }

    pub fn with_settings(models: M, settings: ProjectSettings) -> Self {
        let project = Project::untitled(&models, settings);
        Self { models, project }
    }

    pub fn models(&self) -> &M {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut M {
        &mut self.models
    }

    pub fn settings(&self) -> &ProjectSettings {
        self.project.settings()
    }

    pub fn current_project_dir(&self) -> Option<&Path> {
        self.project.dir()
    }

    pub fn is_modified(&self) -> bool {
        self.project.is_modified(&self.models)
    }

    /// Title of the current project, e.g. `*alpha`.
    pub fn title(&self) -> String {
        project_title(self.current_project_dir(), self.is_modified())
    }

    /// Saves a fresh project into `dir`, which becomes current on success. Model content is kept.
    pub fn create_new_project(&mut self, dir: &Path) -> ProjectResult<()> {
        self.ensure_unmodified("create a new project")?;
        let mut project = Project::untitled(&self.models, self.settings().clone());
        project.save(dir, &self.models)?;
        self.project = project;
        info!("created project in {}", dir.display());
        Ok(())
    }

    pub fn save_current_project(&mut self) -> ProjectResult<()> {
        let dir = self
            .project
            .dir()
            .ok_or(ProjectError::NoProjectDir)?
            .to_path_buf();
        self.project.save(&dir, &self.models)
    }

    /// Saves into `dir` and rebinds the current project to it on success.
    pub fn save_project_as(&mut self, dir: &Path) -> ProjectResult<()> {
        self.project.save(dir, &self.models)
    }

    /// Loads the project stored in `dir`. On failure both the models and the current project
    /// stay as they were.
    pub fn open_existing_project(&mut self, dir: &Path) -> ProjectResult<()> {
        self.ensure_unmodified("open a project")?;
        let mut project = Project::untitled(&self.models, self.settings().clone());
        project.load(dir, &mut self.models)?;
        self.project = project;
        Ok(())
    }

    /// Replaces the current project by an untitled one without looking at unsaved changes.
    pub fn close_current_project(&mut self) {
        if let Some(dir) = self.project.dir() {
            info!("closed project {}", dir.display());
        }
        self.project = Project::untitled(&self.models, self.settings().clone());
    }

    fn ensure_unmodified(&self, action: &str) -> ProjectResult<()> {
        if self.is_modified() {
            warn!("cannot {action}: current project has unsaved modifications");
            return Err(ProjectError::Modified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestModels;
    use tempfile::tempdir;

    #[test]
    fn starts_untitled_and_clean() {
        let manager = ProjectManager::new(TestModels::new());
        assert!(manager.current_project_dir().is_none());
        assert!(!manager.is_modified());
        assert_eq!(manager.title(), "Untitled");
    }

    #[test]
    fn create_new_project_refuses_unsaved_changes() {
        let dir = tempdir().unwrap();
        let mut manager = ProjectManager::new(TestModels::new());
        manager.models_mut().add_axis();
        assert!(manager.is_modified());
        assert_eq!(manager.title(), "*Untitled");

        let err = manager.create_new_project(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Modified));
        assert!(manager.current_project_dir().is_none());
        assert!(manager.is_modified());
        assert!(!dir.path().join("samplemodel.json").exists());
    }

    #[test]
    fn save_requires_a_directory() {
        let mut manager = ProjectManager::new(TestModels::new());
        assert!(matches!(
            manager.save_current_project(),
            Err(ProjectError::NoProjectDir)
        ));
    }

    #[test]
    fn save_as_then_save_current() {
        let dir = tempdir().unwrap();
        let mut manager = ProjectManager::new(TestModels::new());
        manager.models_mut().add_axis();
        manager.save_project_as(dir.path()).unwrap();
        assert_eq!(manager.current_project_dir(), Some(dir.path()));
        assert!(!manager.is_modified());

        manager.models_mut().add_axis();
        assert!(manager.is_modified());
        manager.save_current_project().unwrap();
        assert!(!manager.is_modified());
    }

    #[test]
    fn open_restores_saved_content() {
        let dir = tempdir().unwrap();
        let mut manager = ProjectManager::new(TestModels::new());
        manager.models_mut().add_axis();
        manager.save_project_as(dir.path()).unwrap();

        manager.models_mut().add_axis();
        assert!(matches!(
            manager.open_existing_project(dir.path()),
            Err(ProjectError::Modified)
        ));

        manager.close_current_project();
        assert!(!manager.is_modified());
        assert!(manager.current_project_dir().is_none());
        manager.open_existing_project(dir.path()).unwrap();
        assert_eq!(manager.models().sample.top_items().len(), 1);
        assert_eq!(manager.current_project_dir(), Some(dir.path()));
        assert!(!manager.is_modified());
    }

    #[test]
    fn failed_open_keeps_current_project() {
        let dir = tempdir().unwrap();
        let empty = tempdir().unwrap();
        let mut manager = ProjectManager::new(TestModels::new());
        manager.save_project_as(dir.path()).unwrap();

        let err = manager.open_existing_project(empty.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Io(_)));
        assert_eq!(manager.current_project_dir(), Some(dir.path()));
    }
}
