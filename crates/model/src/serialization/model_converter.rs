use log::debug;
use serde_json::{json, Value};

use crate::error::{ModelError, ModelResult};
use crate::model::SessionModel;
use crate::serialization::format::{
    array_at, JsonItemFormatAssistant, JsonObject, ITEMS_KEY, MODEL_KEY,
};
use crate::serialization::item_converter::JsonItemConverter;
use crate::tree::ItemTree;

/// Converts a whole model to `{"model": type, "items": [...]}` and back.
/// 將整個模型轉為 `{"model", "items"}` 文件，或由文件還原。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModelConverter {
    assistant: JsonItemFormatAssistant,
}

impl JsonModelConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self, model: &SessionModel) -> JsonObject {
        let converter = JsonItemConverter::new(model.factory());
        let items: Vec<Value> = model
            .top_items()
            .into_iter()
            .filter_map(|item| converter.to_json(model.tree(), item.id()).ok())
            .map(Value::Object)
            .collect();
        let mut object = JsonObject::new();
        object.insert(MODEL_KEY.into(), json!(model.model_type()));
        object.insert(ITEMS_KEY.into(), Value::Array(items));
        object
    }

    /// Builds the top-level subtrees of a model document using `model`'s factory, without
    /// touching the model.
    pub fn items_from_json(
        &self,
        json: &Value,
        model: &SessionModel,
    ) -> ModelResult<Vec<ItemTree>> {
        self.assistant.validate_model(json)?;
        let object = json
            .as_object()
            .ok_or_else(|| ModelError::malformed("$: not a session model object"))?;
        let found = object
            .get(MODEL_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if found != model.model_type() {
            return Err(ModelError::ModelTypeMismatch {
                expected: model.model_type().to_string(),
                found: found.to_string(),
            });
        }
        let converter = JsonItemConverter::new(model.factory());
        array_at(object, ITEMS_KEY)
            .iter()
            .map(|item| converter.from_json(item))
            .collect()
    }

    /// Replaces the content of `model` by the document. On error the model is left unchanged.
    /// 以文件內容取代模型；失敗時模型保持原狀。
    pub fn from_json(&self, json: &Value, model: &mut SessionModel) -> ModelResult<()> {
        let items = self.items_from_json(json, model)?;
        debug!("{}: restoring {} top-level items", model.model_type(), items.len());
        model.reset_items(items)
    }
}
