use mvvm_model::standard_items::VIEWPORT_AXIS_TYPE;
use mvvm_model::SessionModel;

use crate::models::ApplicationModels;

pub(crate) struct TestModels {
    pub sample: SessionModel,
    pub material: SessionModel,
}

impl TestModels {
    pub fn new() -> Self {
        Self {
            sample: SessionModel::new("SampleModel"),
            material: SessionModel::new("MaterialModel"),
        }
    }

    pub fn add_axis(&mut self) {
        self.sample
            .insert_new_item(VIEWPORT_AXIS_TYPE, None, None, None)
            .unwrap();
    }
}

impl ApplicationModels for TestModels {
    fn persistent_models(&self) -> Vec<&SessionModel> {
        vec![&self.sample, &self.material]
    }

    fn persistent_models_mut(&mut self) -> Vec<&mut SessionModel> {
        vec![&mut self.sample, &mut self.material]
    }
}
