use serde_json::{json, Value};

use crate::error::{ModelError, ModelResult};
use crate::factory::ItemFactory;
use crate::item::{ItemId, SessionItem};
use crate::serialization::format::{
    array_at, JsonItemFormatAssistant, JsonObject, ALLOWED_KEY, CONTAINERS_KEY, DEFAULT_TAG_KEY,
    DISPLAY_NAME_KEY, EDITABLE_KEY, ITEMS_KEY, ITEM_DATA_KEY, ITEM_TAGS_KEY, LIMITS_KEY, MAX_KEY,
    MIN_KEY, MODEL_KEY, ROLE_KEY, TAG_KEY, VALUE_KEY,
};
use crate::serialization::variant_codec::{
    limits_from_json, limits_to_json, variant_from_json, variant_to_json,
};
use crate::tag::TagInfo;
use crate::tree::ItemTree;

/// Converts item subtrees to JSON objects and back, creating items through a factory.
/// 在項目子樹與 JSON 物件之間轉換；還原時透過工廠建立項目。
#[derive(Debug)]
pub struct JsonItemConverter<'a> {
    factory: &'a ItemFactory,
    assistant: JsonItemFormatAssistant,
}

impl<'a> JsonItemConverter<'a> {
    pub fn new(factory: &'a ItemFactory) -> Self {
        Self {
            factory,
            assistant: JsonItemFormatAssistant::new(),
        }
    }

    /// Serializes `id` and everything below it.
    pub fn to_json(&self, tree: &ItemTree, id: ItemId) -> ModelResult<JsonObject> {
        let item = tree.item(id).ok_or(ModelError::ItemNotFound(id))?;
        Ok(item_to_json(tree, item))
    }

    /// Serializes a whole detached subtree.
    pub fn tree_to_json(&self, tree: &ItemTree) -> JsonObject {
        item_to_json(tree, tree.root())
    }

    /// Rebuilds a subtree. The whole document is validated, and every model type checked against
    /// the factory, before the first item is created.
    /// 重建子樹；建立任何項目之前先驗證整份文件。
    pub fn from_json(&self, json: &Value) -> ModelResult<ItemTree> {
        self.assistant.validate_item(json)?;
        self.check_types(json)?;
        self.build(json)
    }

    fn check_types(&self, json: &Value) -> ModelResult<()> {
        let model_type = json
            .get(MODEL_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::malformed("item without model type"))?;
        if !self.factory.is_registered(model_type) {
            return Err(ModelError::UnknownType(model_type.to_string()));
        }
        for container in containers(json) {
            for child in array_at(container, ITEMS_KEY) {
                self.check_types(child)?;
            }
        }
        Ok(())
    }

    fn build(&self, json: &Value) -> ModelResult<ItemTree> {
        let object = json
            .as_object()
            .ok_or_else(|| ModelError::malformed("item is not an object"))?;
        let model_type = object
            .get(MODEL_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::malformed("item without model type"))?;
        let mut item = self.factory.create_item(model_type)?;

        for entry in array_at(object, ITEM_DATA_KEY) {
            restore_entry(&mut item, entry)?;
        }

        let mut children = Vec::new();
        for container in containers(json) {
            let tag = string_at(container, TAG_KEY)?;
            if !item.tags().has_tag(tag) {
                item.register_tag(tag_info_from_json(container, tag)?, false)?;
            }
            for child in array_at(container, ITEMS_KEY) {
                children.push((tag.to_string(), child));
            }
        }
        let default_tag = json
            .get(ITEM_TAGS_KEY)
            .and_then(|tags| tags.get(DEFAULT_TAG_KEY))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !default_tag.is_empty() && item.default_tag() != Some(default_tag) {
            item.tags_mut().set_default_tag(default_tag)?;
        }

        let mut tree = ItemTree::new(item);
        let root = tree.root_id();
        for (tag, child) in children {
            let subtree = self.build(child)?;
            tree.insert_item(root, subtree, Some(&tag), None)?;
        }
        Ok(tree)
    }
}

fn item_to_json(tree: &ItemTree, item: &SessionItem) -> JsonObject {
    let item_data: Vec<Value> = item
        .properties()
        .iter()
        .map(|slot| {
            let mut entry = JsonObject::new();
            entry.insert(ROLE_KEY.into(), json!(slot.role()));
            entry.insert(VALUE_KEY.into(), variant_to_json(slot.value()));
            entry.insert(DISPLAY_NAME_KEY.into(), json!(slot.display_name()));
            entry.insert(EDITABLE_KEY.into(), json!(slot.is_editable()));
            if let Some(limits) = slot.limits() {
                entry.insert(LIMITS_KEY.into(), limits_to_json(&limits));
            }
            Value::Object(entry)
        })
        .collect();

    let containers: Vec<Value> = item
        .tags()
        .containers()
        .iter()
        .map(|container| {
            let info = container.info();
            let items: Vec<Value> = container
                .items()
                .iter()
                .filter_map(|id| tree.item(*id))
                .map(|child| Value::Object(item_to_json(tree, child)))
                .collect();
            json!({
                TAG_KEY: info.name(),
                ALLOWED_KEY: info.model_types(),
                MIN_KEY: info.min(),
                MAX_KEY: info.max(),
                ITEMS_KEY: items,
            })
        })
        .collect();

    let mut object = JsonObject::new();
    object.insert(MODEL_KEY.into(), json!(item.model_type()));
    object.insert(ITEM_DATA_KEY.into(), Value::Array(item_data));
    object.insert(
        ITEM_TAGS_KEY.into(),
        json!({
            DEFAULT_TAG_KEY: item.default_tag().unwrap_or_default(),
            CONTAINERS_KEY: containers,
        }),
    );
    object
}

fn restore_entry(item: &mut SessionItem, entry: &Value) -> ModelResult<()> {
    let entry = entry
        .as_object()
        .ok_or_else(|| ModelError::malformed("property entry is not an object"))?;
    let role = string_at(entry, ROLE_KEY)?;
    let value = entry
        .get(VALUE_KEY)
        .ok_or_else(|| ModelError::malformed(format!("property '{role}' without value")))
        .and_then(variant_from_json)?;
    let slot = item.restore_property(role, value)?;
    if let Some(name) = entry.get(DISPLAY_NAME_KEY).and_then(Value::as_str) {
        slot.set_display_name(name);
    }
    if let Some(editable) = entry.get(EDITABLE_KEY).and_then(Value::as_bool) {
        slot.set_editable(editable);
    }
    if let Some(limits) = entry.get(LIMITS_KEY) {
        slot.set_limits(limits_from_json(limits)?);
    }
    Ok(())
}

fn containers(item: &Value) -> impl Iterator<Item = &JsonObject> {
    item.get(ITEM_TAGS_KEY)
        .and_then(|tags| tags.get(CONTAINERS_KEY))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn string_at<'j>(json: &'j JsonObject, key: &str) -> ModelResult<&'j str> {
    json.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::malformed(format!("missing string '{key}'")))
}

fn tag_info_from_json(container: &JsonObject, tag: &str) -> ModelResult<TagInfo> {
    let allowed = array_at(container, ALLOWED_KEY)
        .iter()
        .map(|value| {
            value.as_str().map(str::to_string).ok_or_else(|| {
                ModelError::malformed(format!("tag '{tag}': allowed type is not a string"))
            })
        })
        .collect::<ModelResult<Vec<String>>>()?;
    let min = container.get(MIN_KEY).and_then(Value::as_u64).unwrap_or(0) as usize;
    let max = container
        .get(MAX_KEY)
        .and_then(Value::as_u64)
        .map(|max| max as usize);
    Ok(TagInfo::new(tag, min, max, allowed))
}
