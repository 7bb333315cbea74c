use mvvm_model::SessionModel;

/// The set of models an application persists as one project.  
/// 應用程式以單一專案儲存的模型集合。
pub trait ApplicationModels {
    /// Models written to and read from the project directory, in a stable order.
    fn persistent_models(&self) -> Vec<&SessionModel>;

    fn persistent_models_mut(&mut self) -> Vec<&mut SessionModel>;

    /// Revisions of the persistent models, used to detect unsaved changes.
    fn revisions(&self) -> Vec<u64> {
        self.persistent_models()
            .iter()
            .map(|model| model.revision())
            .collect()
    }
}
