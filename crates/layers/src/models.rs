use log::debug;
use mvvm_model::{ItemFactory, ItemId, ItemTree, ModelResult, SessionItem, SessionModel};
use mvvm_project::ApplicationModels;

use crate::items::{
    create_material, material_link, register_material_items, register_sample_items,
    LAYER_TYPE, MATERIAL_CONTAINER_TYPE, MULTI_LAYER_TYPE, P_MATERIAL, P_NAME, P_THICKNESS,
};

pub const SAMPLE_MODEL_TYPE: &str = "SampleModel";
pub const MATERIAL_MODEL_TYPE: &str = "MaterialModel";

pub fn sample_model() -> SessionModel {
    let mut factory = ItemFactory::with_standard_items();
    register_sample_items(&mut factory);
    SessionModel::with_factory(SAMPLE_MODEL_TYPE, factory)
}

/// Material model pre-filled with a container holding air and a silicon substrate.
pub fn material_model() -> ModelResult<SessionModel> {
    let mut factory = ItemFactory::with_standard_items();
    register_material_items(&mut factory);
    let mut model = SessionModel::with_factory(MATERIAL_MODEL_TYPE, factory);
    let container = model.insert_new_item(MATERIAL_CONTAINER_TYPE, None, None, None)?;
    for material in [
        create_material("Air", "#b3e5fc", 0.0, 0.0)?,
        create_material("Substrate", "#8d6e63", 2.07e-6, 2.38e-11)?,
    ] {
        model.insert_item(ItemTree::new(material), Some(container), None, None)?;
    }
    Ok(model)
}

/// Sample and material models of the layer editor, persisted together.  
/// 層編輯器的樣品模型與材料模型，一同存成專案。
#[derive(Debug)]
pub struct LayerModels {
    pub sample: SessionModel,
    pub materials: SessionModel,
}

impl LayerModels {
    pub fn new() -> ModelResult<Self> {
        Ok(Self {
            sample: sample_model(),
            materials: material_model()?,
        })
    }

    /// The first top-level multilayer, created when the sample is empty.
    pub fn ensure_multilayer(&mut self) -> ModelResult<ItemId> {
        if let Some(item) = self
            .sample
            .top_items()
            .into_iter()
            .find(|item| item.model_type() == MULTI_LAYER_TYPE)
        {
            return Ok(item.id());
        }
        self.sample.insert_new_item(MULTI_LAYER_TYPE, None, None, None)
    }

    /// Appends a layer to the top multilayer, linking it to `material` when such a material
    /// exists.  
    /// 在最上層的 MultiLayer 末端加入一層，若材料存在則建立連結。
    pub fn add_layer(
        &mut self,
        name: &str,
        thickness: f64,
        material: Option<&str>,
    ) -> ModelResult<ItemId> {
        let multilayer = self.ensure_multilayer()?;
        let link = match material {
            Some(material) => self.find_material(material).map(material_link).transpose()?,
            None => None,
        };
        let layer = self
            .sample
            .insert_new_item(LAYER_TYPE, Some(multilayer), None, None)?;
        self.sample.set_property(layer, P_NAME, name)?;
        self.sample.set_property(layer, P_THICKNESS, thickness)?;
        if let Some(link) = link {
            self.sample.set_property(layer, P_MATERIAL, link)?;
        }
        debug!("added layer '{name}' ({thickness})");
        Ok(layer)
    }

    fn find_material(&self, name: &str) -> Option<&SessionItem> {
        self.materials
            .tree()
            .descendants(self.materials.root_id())
            .into_iter()
            .filter_map(|id| self.materials.item(id))
            .find(|item| item.property::<String>(P_NAME).map_or(false, |n| n == name))
    }
}

impl ApplicationModels for LayerModels {
    fn persistent_models(&self) -> Vec<&SessionModel> {
        vec![&self.sample, &self.materials]
    }

    fn persistent_models_mut(&mut self) -> Vec<&mut SessionModel> {
        vec![&mut self.sample, &mut self.materials]
    }
}
