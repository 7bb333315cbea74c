//! Multilayer sample and material items with their models.
//! 多層膜樣品與材料的項目定義與模型。

pub mod items;
mod models;

pub use models::{material_model, sample_model, LayerModels, MATERIAL_MODEL_TYPE, SAMPLE_MODEL_TYPE};
