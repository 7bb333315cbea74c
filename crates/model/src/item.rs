use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ModelError, ModelResult};
use crate::tag::{TagInfo, TaggedItems};
use crate::variant::{FromVariant, RealLimits, Variant};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a session item.
/// 每個項目在行程內唯一的識別碼。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn new() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A named property value with its editor metadata.
/// 具名屬性值及其編輯器中繼資料。
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySlot {
    role: String,
    value: Variant,
    display_name: String,
    editable: bool,
    limits: Option<RealLimits>,
}

impl PropertySlot {
    fn new(role: &str, value: Variant) -> Self {
        Self {
            role: role.to_string(),
            value,
            display_name: role.to_string(),
            editable: true,
            limits: None,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn value(&self) -> &Variant {
        &self.value
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn limits(&self) -> Option<RealLimits> {
        self.limits
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.display_name = name.into();
        self
    }

    pub fn set_editable(&mut self, editable: bool) -> &mut Self {
        self.editable = editable;
        self
    }

    pub fn set_limits(&mut self, limits: RealLimits) -> &mut Self {
        self.limits = Some(limits);
        self
    }

    fn check_kind(&self, value: &Variant) -> ModelResult<()> {
        if self.value.is_same_kind(value) {
            Ok(())
        } else {
            Err(ModelError::TypeMismatch {
                role: self.role.clone(),
                expected: self.value.kind(),
                found: value.kind(),
            })
        }
    }
}

/// A node of the session tree: model type, ordered property slots and tagged child containers.
/// Children are referenced by id; the owning [`crate::ItemTree`] stores the nodes.
/// 工作階段樹的節點：模型型別、屬性欄位與帶標籤的子容器。
#[derive(Debug, PartialEq)]
pub struct SessionItem {
    id: ItemId,
    model_type: String,
    display_name: String,
    parent: Option<ItemId>,
    properties: Vec<PropertySlot>,
    tags: TaggedItems,
}

impl SessionItem {
    pub fn new(model_type: impl Into<String>) -> Self {
        let model_type = model_type.into();
        Self {
            id: ItemId::new(),
            display_name: model_type.clone(),
            model_type,
            parent: None,
            properties: Vec::new(),
            tags: TaggedItems::default(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.display_name = name.into();
        self
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ItemId>) {
        self.parent = parent;
    }

    /// Declares a new property with its initial value.
    pub fn add_property(
        &mut self,
        role: &str,
        value: impl Into<Variant>,
    ) -> ModelResult<&mut PropertySlot> {
        if self.has_property(role) {
            return Err(ModelError::DuplicateRole(role.to_string()));
        }
        self.properties.push(PropertySlot::new(role, value.into()));
        let last = self.properties.len() - 1;
        Ok(&mut self.properties[last])
    }

    pub fn has_property(&self, role: &str) -> bool {
        self.slot(role).is_some()
    }

    pub fn properties(&self) -> &[PropertySlot] {
        &self.properties
    }

    pub fn slot(&self, role: &str) -> Option<&PropertySlot> {
        self.properties.iter().find(|slot| slot.role == role)
    }

    pub fn slot_mut(&mut self, role: &str) -> Option<&mut PropertySlot> {
        self.properties.iter_mut().find(|slot| slot.role == role)
    }

    pub fn value(&self, role: &str) -> ModelResult<&Variant> {
        self.slot(role)
            .map(PropertySlot::value)
            .ok_or_else(|| ModelError::UnknownRole(role.to_string()))
    }

    /// Reads a property as `T`, failing when the stored kind differs.
    /// 以指定型別讀取屬性；型別不符時回傳錯誤。
    pub fn property<T: FromVariant>(&self, role: &str) -> ModelResult<T> {
        let value = self.value(role)?;
        T::from_variant(value).ok_or_else(|| ModelError::TypeMismatch {
            role: role.to_string(),
            expected: T::KIND,
            found: value.kind(),
        })
    }

    /// Writes a property. Rejected without change when the slot is read-only or the kind differs.
    /// 寫入屬性；欄位唯讀或型別不符時不做任何變更。
    pub fn set_property(&mut self, role: &str, value: impl Into<Variant>) -> ModelResult<()> {
        let value = value.into();
        let slot = self
            .slot_mut(role)
            .ok_or_else(|| ModelError::UnknownRole(role.to_string()))?;
        if !slot.editable {
            return Err(ModelError::NotEditable(role.to_string()));
        }
        slot.check_kind(&value)?;
        slot.value = value;
        Ok(())
    }

    /// Restores a value read from a document: ignores the editable flag and declares the slot
    /// when the constructor did not.
    pub(crate) fn restore_property(
        &mut self,
        role: &str,
        value: Variant,
    ) -> ModelResult<&mut PropertySlot> {
        if let Some(index) = self.properties.iter().position(|slot| slot.role == role) {
            let slot = &mut self.properties[index];
            slot.check_kind(&value)?;
            slot.value = value;
            Ok(slot)
        } else {
            self.add_property(role, value)
        }
    }

    pub fn register_tag(&mut self, info: TagInfo, set_as_default: bool) -> ModelResult<()> {
        self.tags.register_tag(info, set_as_default)
    }

    pub fn tags(&self) -> &TaggedItems {
        &self.tags
    }

    pub(crate) fn tags_mut(&mut self) -> &mut TaggedItems {
        &mut self.tags
    }

    pub fn default_tag(&self) -> Option<&str> {
        self.tags.default_tag()
    }

    /// Ids of the children in `tag`, in order. Empty when the tag is unknown.
    pub fn child_ids(&self, tag: &str) -> &[ItemId] {
        self.tags.container(tag).map(|c| c.items()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::VariantKind;

    fn layer() -> SessionItem {
        let mut item = SessionItem::new("Layer");
        item.add_property("P_NAME", "Layer")
            .unwrap()
            .set_display_name("Name");
        item.add_property("P_THICKNESS", 42.0)
            .unwrap()
            .set_display_name("Thickness")
            .set_limits(RealLimits::nonnegative());
        item
    }

    #[test]
    fn identifiers_are_unique() {
        let a = SessionItem::new("Layer");
        let b = SessionItem::new("Layer");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.display_name(), "Layer");
    }

    #[test]
    fn add_property_rejects_duplicate_role() {
        let mut item = layer();
        assert_eq!(
            item.add_property("P_NAME", "again").err(),
            Some(ModelError::DuplicateRole("P_NAME".into()))
        );
        assert_eq!(item.properties().len(), 2);
        assert_eq!(item.slot("P_THICKNESS").unwrap().display_name(), "Thickness");
    }

    #[test]
    fn typed_property_access() {
        let mut item = layer();
        assert_eq!(item.property::<f64>("P_THICKNESS").unwrap(), 42.0);
        assert_eq!(item.property::<String>("P_NAME").unwrap(), "Layer");
        assert_eq!(
            item.property::<i64>("P_THICKNESS"),
            Err(ModelError::TypeMismatch {
                role: "P_THICKNESS".into(),
                expected: VariantKind::Int,
                found: VariantKind::Real,
            })
        );
        item.set_property("P_THICKNESS", 10.5).unwrap();
        assert_eq!(item.property::<f64>("P_THICKNESS").unwrap(), 10.5);
        assert_eq!(
            item.property::<bool>("P_MISSING"),
            Err(ModelError::UnknownRole("P_MISSING".into()))
        );
    }

    #[test]
    fn set_property_rejects_other_kind_without_change() {
        let mut item = layer();
        let err = item.set_property("P_THICKNESS", "thick").unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
        assert_eq!(item.property::<f64>("P_THICKNESS").unwrap(), 42.0);
    }

    #[test]
    fn set_property_on_read_only_slot_is_a_no_op() {
        let mut item = layer();
        item.slot_mut("P_THICKNESS").unwrap().set_editable(false);
        assert_eq!(
            item.set_property("P_THICKNESS", 1.0),
            Err(ModelError::NotEditable("P_THICKNESS".into()))
        );
        assert_eq!(item.property::<f64>("P_THICKNESS").unwrap(), 42.0);
    }

    #[test]
    fn restore_property_ignores_editable_flag_and_declares_missing_slots() {
        let mut item = layer();
        item.slot_mut("P_THICKNESS").unwrap().set_editable(false);
        item.restore_property("P_THICKNESS", Variant::Real(3.0)).unwrap();
        assert_eq!(item.property::<f64>("P_THICKNESS").unwrap(), 3.0);
        item.restore_property("P_EXTRA", Variant::Bool(true)).unwrap();
        assert!(item.property::<bool>("P_EXTRA").unwrap());
    }

    #[test]
    fn register_tag_rejects_duplicates() {
        let mut item = SessionItem::new("MultiLayer");
        item.register_tag(TagInfo::universal_tag("T_LAYERS", ["Layer"]), true)
            .unwrap();
        assert_eq!(
            item.register_tag(TagInfo::universal_tag("T_LAYERS", ["Layer"]), false),
            Err(ModelError::DuplicateTag("T_LAYERS".into()))
        );
        assert_eq!(item.default_tag(), Some("T_LAYERS"));
        assert!(item.child_ids("T_LAYERS").is_empty());
        assert!(item.child_ids("T_OTHER").is_empty());
    }
}
