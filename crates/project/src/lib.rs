//! Directory-backed projects persisting a set of session models.
//! 以目錄保存一組會話模型的專案管理。

mod decorator;
mod manager;
mod models;
mod project;
mod settings;
#[cfg(test)]
mod testing;
mod title;
mod util;

pub use decorator::{ProjectManagerDecorator, SaveChangesAnswer, UserInteractor};
pub use manager::ProjectManager;
pub use models::ApplicationModels;
pub use project::{Project, ProjectError, ProjectResult};
pub use settings::ProjectSettings;
pub use title::{project_title, UNTITLED_TITLE};
