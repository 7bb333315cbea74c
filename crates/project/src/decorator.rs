use std::path::{Path, PathBuf};

use log::info;

use crate::manager::ProjectManager;
use crate::models::ApplicationModels;
use crate::project::ProjectResult;

/// Answer to "save changes before continuing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChangesAnswer {
    Save,
    Discard,
    Cancel,
}

/// User-facing callbacks consulted by [`ProjectManagerDecorator`].  
/// 由 [`ProjectManagerDecorator`] 呼叫的使用者互動介面。
pub trait UserInteractor {
    /// Asks for a project directory; `None` when the user backs out.
    fn select_dir(&mut self) -> Option<PathBuf>;

    fn on_save_changes_request(&mut self) -> SaveChangesAnswer;
}

/// Interactive front of [`ProjectManager`]: asks before unsaved changes get lost and asks for a
/// directory whenever one is needed but not given. Every operation returns `Ok(false)` when the
/// user cancels.  
/// 互動式專案管理：遺失未儲存變更前先詢問，需要目錄時向使用者索取；使用者取消時回傳 `Ok(false)`。
pub struct ProjectManagerDecorator<M, U> {
    manager: ProjectManager<M>,
    interactor: U,
}

impl<M: ApplicationModels, U: UserInteractor> ProjectManagerDecorator<M, U> {
    pub fn new(manager: ProjectManager<M>, interactor: U) -> Self {
        Self {
            manager,
            interactor,
        }
    }

    pub fn manager(&self) -> &ProjectManager<M> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ProjectManager<M> {
        &mut self.manager
    }

    pub fn interactor(&self) -> &U {
        &self.interactor
    }

    pub fn into_inner(self) -> ProjectManager<M> {
        self.manager
    }

    pub fn create_new_project(&mut self, dir: Option<&Path>) -> ProjectResult<bool> {
        if !self.save_before_closing()? {
            return Ok(false);
        }
        let Some(dir) = self.resolve_dir(dir) else {
            return Ok(false);
        };
        self.manager.close_current_project();
        self.manager.create_new_project(&dir)?;
        Ok(true)
    }

    /// Saves into the bound directory, asking for one when the project is untitled.
    pub fn save_current_project(&mut self) -> ProjectResult<bool> {
        match self.manager.current_project_dir().map(Path::to_path_buf) {
            Some(dir) => {
                self.manager.save_project_as(&dir)?;
                Ok(true)
            }
            None => self.save_project_as(None),
        }
    }

    pub fn save_project_as(&mut self, dir: Option<&Path>) -> ProjectResult<bool> {
        let Some(dir) = self.resolve_dir(dir) else {
            return Ok(false);
        };
        self.manager.save_project_as(&dir)?;
        Ok(true)
    }

    pub fn open_existing_project(&mut self, dir: Option<&Path>) -> ProjectResult<bool> {
        if !self.save_before_closing()? {
            return Ok(false);
        }
        let Some(dir) = self.resolve_dir(dir) else {
            return Ok(false);
        };
        self.manager.close_current_project();
        self.manager.open_existing_project(&dir)?;
        Ok(true)
    }

    pub fn close_current_project(&mut self) -> ProjectResult<bool> {
        if !self.save_before_closing()? {
            return Ok(false);
        }
        self.manager.close_current_project();
        Ok(true)
    }

    fn resolve_dir(&mut self, dir: Option<&Path>) -> Option<PathBuf> {
        dir.map(Path::to_path_buf)
            .or_else(|| self.interactor.select_dir())
    }

    /// `Ok(true)` when it is fine to drop the current project.
    fn save_before_closing(&mut self) -> ProjectResult<bool> {
        if !self.manager.is_modified() {
            return Ok(true);
        }
        match self.interactor.on_save_changes_request() {
            SaveChangesAnswer::Save => self.save_current_project(),
            SaveChangesAnswer::Discard => {
                info!("discarding unsaved project changes");
                Ok(true)
            }
            SaveChangesAnswer::Cancel => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestModels;
    use std::collections::VecDeque;
    use tempfile::tempdir;

    struct ScriptedUser {
        dirs: VecDeque<Option<PathBuf>>,
        answer: SaveChangesAnswer,
        asked: usize,
    }

    impl ScriptedUser {
        fn new(answer: SaveChangesAnswer, dirs: Vec<Option<PathBuf>>) -> Self {
            Self {
                dirs: dirs.into(),
                answer,
                asked: 0,
            }
        }
    }

    impl UserInteractor for ScriptedUser {
        fn select_dir(&mut self) -> Option<PathBuf> {
            self.dirs.pop_front().flatten()
        }

        fn on_save_changes_request(&mut self) -> SaveChangesAnswer {
            self.asked += 1;
            self.answer
        }
    }

    fn modified_manager() -> ProjectManager<TestModels> {
        let mut manager = ProjectManager::new(TestModels::new());
        manager.models_mut().add_axis();
        manager
    }

    #[test]
    fn cancel_keeps_everything() {
        let dir = tempdir().unwrap();
        let user = ScriptedUser::new(SaveChangesAnswer::Cancel, vec![]);
        let mut decorator = ProjectManagerDecorator::new(modified_manager(), user);
        assert!(!decorator.create_new_project(Some(dir.path())).unwrap());
        assert!(!decorator.close_current_project().unwrap());
        assert_eq!(decorator.interactor().asked, 2);
        assert!(decorator.manager().is_modified());
        assert!(decorator.manager().current_project_dir().is_none());
    }

    #[test]
    fn discard_creates_new_project() {
        let dir = tempdir().unwrap();
        let user = ScriptedUser::new(SaveChangesAnswer::Discard, vec![]);
        let mut decorator = ProjectManagerDecorator::new(modified_manager(), user);
        assert!(decorator.create_new_project(Some(dir.path())).unwrap());
        assert_eq!(decorator.manager().current_project_dir(), Some(dir.path()));
        assert!(!decorator.manager().is_modified());
    }

    #[test]
    fn save_asks_for_directory_when_untitled() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let user = ScriptedUser::new(
            SaveChangesAnswer::Save,
            vec![Some(first.path().to_path_buf()), Some(second.path().to_path_buf())],
        );
        let mut decorator = ProjectManagerDecorator::new(modified_manager(), user);
        assert!(decorator.create_new_project(None).unwrap());
        assert!(first.path().join("samplemodel.json").is_file());
        assert_eq!(decorator.manager().current_project_dir(), Some(second.path()));
    }

    #[test]
    fn no_directory_selected_means_cancel() {
        let user = ScriptedUser::new(SaveChangesAnswer::Save, vec![None]);
        let mut decorator = ProjectManagerDecorator::new(modified_manager(), user);
        assert!(!decorator.save_current_project().unwrap());
        assert!(decorator.manager().is_modified());
    }

    #[test]
    fn open_after_saving_changes() {
        let stored = tempdir().unwrap();
        let mut source = ProjectManager::new(TestModels::new());
        source.models_mut().add_axis();
        source.models_mut().add_axis();
        source.save_project_as(stored.path()).unwrap();

        let scratch = tempdir().unwrap();
        let user = ScriptedUser::new(
            SaveChangesAnswer::Save,
            vec![Some(scratch.path().to_path_buf())],
        );
        let mut decorator = ProjectManagerDecorator::new(modified_manager(), user);
        assert!(decorator.open_existing_project(Some(stored.path())).unwrap());
        assert!(scratch.path().join("samplemodel.json").is_file());
        let manager = decorator.into_inner();
        assert_eq!(manager.models().sample.top_items().len(), 2);
        assert_eq!(manager.current_project_dir(), Some(stored.path()));
    }
}
