use crate::error::{ModelError, ModelResult};
use crate::item::ItemId;

/// Constraints of a named child container.
/// 具名子容器的限制條件（允許型別、最少/最多數量）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    name: String,
    min: usize,
    max: Option<usize>,
    model_types: Vec<String>,
}

impl TagInfo {
    pub fn new(
        name: impl Into<String>,
        min: usize,
        max: Option<usize>,
        model_types: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            model_types,
        }
    }

    /// Unbounded container accepting the listed model types (any type when the list is empty).
    pub fn universal_tag<I, S>(name: impl Into<String>, model_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, 0, None, model_types.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn model_types(&self) -> &[String] {
        &self.model_types
    }

    pub fn is_valid_child(&self, model_type: &str) -> bool {
        self.model_types.is_empty() || self.model_types.iter().any(|t| t == model_type)
    }
}

/// Ordered children of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemContainer {
    info: TagInfo,
    items: Vec<ItemId>,
}

impl ItemContainer {
    pub fn new(info: TagInfo) -> Self {
        Self {
            info,
            items: Vec::new(),
        }
    }

    pub fn info(&self) -> &TagInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, row: usize) -> Option<ItemId> {
        self.items.get(row).copied()
    }

    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|candidate| *candidate == id)
    }

    /// Checks an insertion and resolves the target row (`None` appends). When
    /// `pending_removal` is set, one item of this container is about to be taken first.
    pub(crate) fn check_insert(
        &self,
        model_type: &str,
        row: Option<usize>,
        pending_removal: bool,
    ) -> ModelResult<usize> {
        if !self.info.is_valid_child(model_type) {
            return Err(ModelError::TypeNotAllowed {
                tag: self.name().to_string(),
                model_type: model_type.to_string(),
            });
        }
        let len = if pending_removal {
            self.items.len().saturating_sub(1)
        } else {
            self.items.len()
        };
        if let Some(max) = self.info.max() {
            if len >= max {
                return Err(ModelError::CapacityExceeded {
                    tag: self.name().to_string(),
                    max,
                });
            }
        }
        match row {
            None => Ok(len),
            Some(row) if row <= len => Ok(row),
            Some(row) => Err(ModelError::IndexOutOfRange {
                tag: self.name().to_string(),
                row,
                len,
            }),
        }
    }

    pub(crate) fn check_take(&self, row: usize) -> ModelResult<ItemId> {
        let id = self.item_at(row).ok_or_else(|| ModelError::IndexOutOfRange {
            tag: self.name().to_string(),
            row,
            len: self.items.len(),
        })?;
        if self.items.len() <= self.info.min() {
            return Err(ModelError::BelowMinimum {
                tag: self.name().to_string(),
                min: self.info.min(),
            });
        }
        Ok(id)
    }

    pub(crate) fn insert(&mut self, row: usize, id: ItemId) {
        self.items.insert(row, id);
    }

    pub(crate) fn remove(&mut self, row: usize) -> ItemId {
        self.items.remove(row)
    }
}

/// All child containers of an item, in registration order, plus the default tag.
/// 項目的所有子容器（依註冊順序）及預設標籤。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedItems {
    containers: Vec<ItemContainer>,
    default_tag: Option<String>,
}

impl TaggedItems {
    pub fn register_tag(&mut self, info: TagInfo, set_as_default: bool) -> ModelResult<()> {
        if self.container(info.name()).is_some() {
            return Err(ModelError::DuplicateTag(info.name().to_string()));
        }
        if set_as_default {
            self.default_tag = Some(info.name().to_string());
        }
        self.containers.push(ItemContainer::new(info));
        Ok(())
    }

    pub fn default_tag(&self) -> Option<&str> {
        self.default_tag.as_deref()
    }

    pub(crate) fn set_default_tag(&mut self, name: &str) -> ModelResult<()> {
        if self.container(name).is_none() {
            return Err(ModelError::UnknownTag(name.to_string()));
        }
        self.default_tag = Some(name.to_string());
        Ok(())
    }

    /// Resolves an optional tag name to an existing tag, falling back to the default tag.
    pub fn resolve(&self, tag: Option<&str>) -> ModelResult<&str> {
        let name = match tag {
            Some(name) => name,
            None => self.default_tag().ok_or(ModelError::NoDefaultTag)?,
        };
        self.container(name)
            .map(ItemContainer::name)
            .ok_or_else(|| ModelError::UnknownTag(name.to_string()))
    }

    pub fn containers(&self) -> &[ItemContainer] {
        &self.containers
    }

    pub fn container(&self, name: &str) -> Option<&ItemContainer> {
        self.containers.iter().find(|c| c.name() == name)
    }

    pub(crate) fn container_mut(&mut self, name: &str) -> Option<&mut ItemContainer> {
        self.containers.iter_mut().find(|c| c.name() == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.container(name).is_some()
    }

    /// Children of every container, containers in registration order.
    pub fn all_items(&self) -> Vec<ItemId> {
        self.containers
            .iter()
            .flat_map(|c| c.items().iter().copied())
            .collect()
    }

    /// Locates a child, returning its tag name and row.
    pub fn tag_row_of(&self, id: ItemId) -> Option<(&str, usize)> {
        self.containers
            .iter()
            .find_map(|c| c.index_of(id).map(|row| (c.name(), row)))
    }
}
