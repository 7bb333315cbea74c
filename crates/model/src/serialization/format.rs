use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};

pub type JsonObject = Map<String, Value>;

pub const MODEL_KEY: &str = "model";
pub const ITEM_DATA_KEY: &str = "itemData";
pub const ITEM_TAGS_KEY: &str = "itemTags";
pub const DEFAULT_TAG_KEY: &str = "defaultTag";
pub const CONTAINERS_KEY: &str = "containers";
pub const TAG_KEY: &str = "tag";
pub const ALLOWED_KEY: &str = "allowed";
pub const MIN_KEY: &str = "min";
pub const MAX_KEY: &str = "max";
pub const ITEMS_KEY: &str = "items";
pub const ROLE_KEY: &str = "role";
pub const VALUE_KEY: &str = "value";
pub const TYPE_KEY: &str = "type";
pub const DISPLAY_NAME_KEY: &str = "displayName";
pub const EDITABLE_KEY: &str = "editable";
pub const LIMITS_KEY: &str = "limits";

/// Structural checks telling whether a JSON object can represent an item, its tags, one of its
/// containers or a whole model. Only key presence and JSON kinds are checked; whether a child
/// is allowed in its tag is decided when the document is applied.
/// 判斷 JSON 物件是否能表示項目、標籤、容器或模型的結構檢查。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonItemFormatAssistant;

impl JsonItemFormatAssistant {
    pub fn new() -> Self {
        Self
    }

    /// `{"model": string, "itemData": array, "itemTags": object}` and nothing else.
    pub fn is_session_item(&self, json: &JsonObject) -> bool {
        has_exact_keys(json, &[MODEL_KEY, ITEM_DATA_KEY, ITEM_TAGS_KEY])
            && json.get(MODEL_KEY).map_or(false, Value::is_string)
            && json.get(ITEM_DATA_KEY).map_or(false, Value::is_array)
            && json.get(ITEM_TAGS_KEY).map_or(false, Value::is_object)
    }

    /// One `itemData` entry: `role` string and `value` object carrying a string `type`, plus
    /// optional metadata of the right kinds.
    pub fn is_item_data_entry(&self, json: &JsonObject) -> bool {
        let known = [
            ROLE_KEY,
            VALUE_KEY,
            DISPLAY_NAME_KEY,
            EDITABLE_KEY,
            LIMITS_KEY,
        ];
        json.keys().all(|key| known.contains(&key.as_str()))
            && json.get(ROLE_KEY).map_or(false, Value::is_string)
            && json
                .get(VALUE_KEY)
                .and_then(Value::as_object)
                .and_then(|value| value.get(TYPE_KEY))
                .map_or(false, Value::is_string)
            && optional_kind(json, DISPLAY_NAME_KEY, Value::is_string)
            && optional_kind(json, EDITABLE_KEY, Value::is_boolean)
            && optional_kind(json, LIMITS_KEY, Value::is_object)
    }

    /// `{"defaultTag": string, "containers": array}` and nothing else.
    pub fn is_session_item_tags(&self, json: &JsonObject) -> bool {
        has_exact_keys(json, &[DEFAULT_TAG_KEY, CONTAINERS_KEY])
            && json.get(DEFAULT_TAG_KEY).map_or(false, Value::is_string)
            && json.get(CONTAINERS_KEY).map_or(false, Value::is_array)
    }

    /// `{"tag": string, "allowed": [string], "items": array}` with optional numeric `min` and
    /// numeric-or-null `max`.
    pub fn is_session_item_container(&self, json: &JsonObject) -> bool {
        let known = [TAG_KEY, ALLOWED_KEY, MIN_KEY, MAX_KEY, ITEMS_KEY];
        json.keys().all(|key| known.contains(&key.as_str()))
            && json.get(TAG_KEY).map_or(false, Value::is_string)
            && json
                .get(ALLOWED_KEY)
                .and_then(Value::as_array)
                .map_or(false, |types| types.iter().all(Value::is_string))
            && json.get(ITEMS_KEY).map_or(false, Value::is_array)
            && optional_kind(json, MIN_KEY, Value::is_u64)
            && optional_kind(json, MAX_KEY, |v| v.is_u64() || v.is_null())
    }

    /// `{"model": string, "items": array}` and nothing else.
    pub fn is_session_model(&self, json: &JsonObject) -> bool {
        has_exact_keys(json, &[MODEL_KEY, ITEMS_KEY])
            && json.get(MODEL_KEY).map_or(false, Value::is_string)
            && json.get(ITEMS_KEY).map_or(false, Value::is_array)
    }

    /// Recursively checks an item document, reporting the first offending path.
    /// 遞迴檢查項目文件，回報第一個不合法的位置。
    pub fn validate_item(&self, json: &Value) -> ModelResult<()> {
        self.validate_item_at(json, "$")
    }

    /// Checks a model document and every item inside it.
    pub fn validate_model(&self, json: &Value) -> ModelResult<()> {
        let object = json
            .as_object()
            .filter(|object| self.is_session_model(object))
            .ok_or_else(|| ModelError::malformed("$: not a session model object"))?;
        for (index, item) in array_at(object, ITEMS_KEY).iter().enumerate() {
            self.validate_item_at(item, &format!("$.items[{index}]"))?;
        }
        Ok(())
    }

    fn validate_item_at(&self, json: &Value, path: &str) -> ModelResult<()> {
        let object = json
            .as_object()
            .filter(|object| self.is_session_item(object))
            .ok_or_else(|| ModelError::malformed(format!("{path}: not a session item object")))?;

        for (index, entry) in array_at(object, ITEM_DATA_KEY).iter().enumerate() {
            let valid = entry
                .as_object()
                .map_or(false, |entry| self.is_item_data_entry(entry));
            if !valid {
                return Err(ModelError::malformed(format!(
                    "{path}.itemData[{index}]: not a property entry"
                )));
            }
        }

        let tags = object
            .get(ITEM_TAGS_KEY)
            .and_then(Value::as_object)
            .filter(|tags| self.is_session_item_tags(tags))
            .ok_or_else(|| ModelError::malformed(format!("{path}.itemTags: not a tags object")))?;
        for (index, container) in array_at(tags, CONTAINERS_KEY).iter().enumerate() {
            let container_path = format!("{path}.itemTags.containers[{index}]");
            let container = container
                .as_object()
                .filter(|container| self.is_session_item_container(container))
                .ok_or_else(|| {
                    ModelError::malformed(format!("{container_path}: not a container object"))
                })?;
            for (row, child) in array_at(container, ITEMS_KEY).iter().enumerate() {
                self.validate_item_at(child, &format!("{container_path}.items[{row}]"))?;
            }
        }
        Ok(())
    }
}

/// Array stored under `key`, or an empty slice when absent or of another kind.
pub(crate) fn array_at<'a>(json: &'a JsonObject, key: &str) -> &'a [Value] {
    json.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn has_exact_keys(json: &JsonObject, keys: &[&str]) -> bool {
    json.len() == keys.len() && keys.iter().all(|key| json.contains_key(*key))
}

fn optional_kind(json: &JsonObject, key: &str, check: impl Fn(&Value) -> bool) -> bool {
    json.get(key).map_or(true, check)
}
