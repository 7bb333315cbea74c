//! JSON persistence of items and models.
//! 項目與模型的 JSON 序列化。

mod format;
mod item_converter;
mod model_converter;
mod variant_codec;

pub use format::{JsonItemFormatAssistant, JsonObject};
pub use item_converter::JsonItemConverter;
pub use model_converter::JsonModelConverter;
pub use variant_codec::{variant_from_json, variant_to_json};

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::SessionModel;

/// Renders `model` as a JSON document, indented when `pretty` is set.
pub fn model_to_json_string(model: &SessionModel, pretty: bool) -> String {
    let json = Value::Object(JsonModelConverter::new().to_json(model));
    let rendered = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    // Serializing a `Value` cannot fail.
    rendered.unwrap_or_default()
}

/// Parses `text` and replaces the content of `model` with it.
/// 解析 JSON 文字並以其內容取代模型。
pub fn json_string_to_model(text: &str, model: &mut SessionModel) -> ModelResult<()> {
    let json: Value = serde_json::from_str(text)
        .map_err(|err| ModelError::MalformedDocument(format!("invalid JSON: {err}")))?;
    JsonModelConverter::new().from_json(&json, model)
}
