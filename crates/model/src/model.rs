use std::fmt;

use log::debug;

use crate::error::{ModelError, ModelResult};
use crate::factory::ItemFactory;
use crate::item::{ItemId, SessionItem};
use crate::tag::TagInfo;
use crate::tree::{ItemTree, TagRow};
use crate::variant::Variant;

/// Model type of the invisible item owning a model's top-level items.
pub const ROOT_ITEM_TYPE: &str = "SessionModelRoot";
/// Tag of the root item holding top-level items.
pub const ROOT_TAG: &str = "rootTag";

/// Change notification delivered synchronously to subscribers.
/// 同步傳遞給訂閱者的變更通知。
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    ItemInserted { parent: ItemId, tag_row: TagRow },
    AboutToRemoveItem { parent: ItemId, tag_row: TagRow },
    ItemRemoved { parent: ItemId, tag_row: TagRow },
    DataChanged { item: ItemId, role: String },
    ModelAboutToBeReset,
    ModelReset,
}

/// Handle returned by [`SessionModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type ModelCallback = Box<dyn FnMut(&ModelEvent)>;

/// Owns a forest of session items and is the only mutator of their structure and values once
/// they belong to it. Every mutation bumps [`SessionModel::revision`] and notifies subscribers.
/// 擁有項目森林的模型；所有結構與屬性變更都經由模型並觸發通知。
pub struct SessionModel {
    model_type: String,
    factory: ItemFactory,
    tree: ItemTree,
    subscribers: Vec<(SubscriptionId, ModelCallback)>,
    next_subscription: u64,
    revision: u64,
}

impl SessionModel {
    /// Model using the standard item factory.
    pub fn new(model_type: impl Into<String>) -> Self {
        Self::with_factory(model_type, ItemFactory::with_standard_items())
    }

    pub fn with_factory(model_type: impl Into<String>, factory: ItemFactory) -> Self {
        Self {
            model_type: model_type.into(),
            factory,
            tree: ItemTree::new(root_item()),
            subscribers: Vec::new(),
            next_subscription: 1,
            revision: 0,
        }
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn factory(&self) -> &ItemFactory {
        &self.factory
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn root_id(&self) -> ItemId {
        self.tree.root_id()
    }

    pub fn root(&self) -> &SessionItem {
        self.tree.root()
    }

    pub fn item(&self, id: ItemId) -> Option<&SessionItem> {
        self.tree.item(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.tree.contains(id)
    }

    /// Top-level items in order.
    pub fn top_items(&self) -> Vec<&SessionItem> {
        self.tree.get_items(self.root_id(), ROOT_TAG)
    }

    /// Counter bumped by every mutation; used to detect unsaved changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a callback receiving every subsequent event, in subscription order.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ModelEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    /// Creates an item of `model_type` through the factory and inserts it under `parent` (the
    /// root when `None`).
    /// 透過工廠建立指定型別的項目並插入父項目之下。
    pub fn insert_new_item(
        &mut self,
        model_type: &str,
        parent: Option<ItemId>,
        tag: Option<&str>,
        row: Option<usize>,
    ) -> ModelResult<ItemId> {
        let item = self.factory.create_item(model_type)?;
        self.insert_item(ItemTree::new(item), parent, tag, row)
    }

    /// Inserts a prebuilt subtree and returns the id of its root.
    pub fn insert_item(
        &mut self,
        subtree: ItemTree,
        parent: Option<ItemId>,
        tag: Option<&str>,
        row: Option<usize>,
    ) -> ModelResult<ItemId> {
        let parent = parent.unwrap_or_else(|| self.root_id());
        let id = subtree.root_id();
        let tag_row = self.tree.insert_item(parent, subtree, tag, row)?;
        debug!("{}: inserted {id} at {tag_row}", self.model_type);
        self.touch(ModelEvent::ItemInserted { parent, tag_row });
        Ok(id)
    }

    /// Detaches a child and hands its subtree to the caller.
    pub fn take_item(&mut self, parent: ItemId, tag: &str, row: usize) -> ModelResult<ItemTree> {
        self.tree.check_take(parent, tag, row)?;
        let tag_row = TagRow::new(tag, row);
        self.notify(&ModelEvent::AboutToRemoveItem {
            parent,
            tag_row: tag_row.clone(),
        });
        let taken = self.tree.take_item(parent, tag, row)?;
        debug!("{}: took {} from {tag_row}", self.model_type, taken.root_id());
        self.touch(ModelEvent::ItemRemoved { parent, tag_row });
        Ok(taken)
    }

    /// Removes a child and destroys its subtree.
    /// 移除子項目並銷毀其整個子樹。
    pub fn remove_item(&mut self, parent: ItemId, tag: &str, row: usize) -> ModelResult<()> {
        self.take_item(parent, tag, row).map(drop)
    }

    /// Removes the item with the given id wherever it lives.
    pub fn remove(&mut self, id: ItemId) -> ModelResult<()> {
        let parent = self
            .item(id)
            .ok_or(ModelError::ItemNotFound(id))?
            .parent()
            .ok_or_else(|| ModelError::InvalidMove("the root item cannot be removed".into()))?;
        let tag_row = self.tree.tag_row_of(id).ok_or(ModelError::ItemNotFound(id))?;
        self.remove_item(parent, &tag_row.tag, tag_row.row)
    }

    /// Moves `id` under `new_parent`. Every check runs before the item is detached, so a failed
    /// move leaves the model untouched. `row` is the final position after the move.
    /// 移動項目；所有檢查都在取出前完成，失敗時模型保持不變。
    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        tag: Option<&str>,
        row: Option<usize>,
    ) -> ModelResult<TagRow> {
        let new_parent = new_parent.unwrap_or_else(|| self.root_id());
        let item = self.item(id).ok_or(ModelError::ItemNotFound(id))?;
        let model_type = item.model_type().to_string();
        let old_parent = item
            .parent()
            .ok_or_else(|| ModelError::InvalidMove("the root item cannot be moved".into()))?;
        if new_parent == id || self.tree.is_ancestor_of(id, new_parent) {
            return Err(ModelError::InvalidMove(format!(
                "item {id} cannot be moved into its own subtree"
            )));
        }
        let source = self.tree.tag_row_of(id).ok_or(ModelError::ItemNotFound(id))?;
        let (target_tag, target_row) =
            self.tree
                .check_insert(new_parent, &model_type, tag, row, Some(id))?;
        let same_container = old_parent == new_parent && source.tag == target_tag;
        if !same_container {
            self.tree.check_take(old_parent, &source.tag, source.row)?;
        }

        self.notify(&ModelEvent::AboutToRemoveItem {
            parent: old_parent,
            tag_row: source.clone(),
        });
        let subtree = self.tree.detach(old_parent, &source.tag, source.row, id);
        self.touch(ModelEvent::ItemRemoved {
            parent: old_parent,
            tag_row: source,
        });
        self.tree.attach(new_parent, subtree, &target_tag, target_row);
        let tag_row = TagRow::new(target_tag, target_row);
        debug!("{}: moved {id} to {tag_row}", self.model_type);
        self.touch(ModelEvent::ItemInserted {
            parent: new_parent,
            tag_row: tag_row.clone(),
        });
        Ok(tag_row)
    }

    /// Writes a property of a model-owned item and emits `DataChanged` on success.
    pub fn set_property(
        &mut self,
        id: ItemId,
        role: &str,
        value: impl Into<Variant>,
    ) -> ModelResult<()> {
        let item = self.tree.item_mut(id).ok_or(ModelError::ItemNotFound(id))?;
        item.set_property(role, value)?;
        self.touch(ModelEvent::DataChanged {
            item: id,
            role: role.to_string(),
        });
        Ok(())
    }

    /// Removes every top-level item.
    pub fn clear(&mut self) {
        self.reset_with(Vec::new());
    }

    /// Replaces the whole forest by `items`, appended to the root in order. All items are
    /// checked against the root tag before anything is replaced.
    pub fn reset_items(&mut self, items: Vec<ItemTree>) -> ModelResult<()> {
        let template = root_item();
        let info = template
            .tags()
            .container(ROOT_TAG)
            .map(|container| container.info().clone())
            .ok_or_else(|| ModelError::UnknownTag(ROOT_TAG.to_string()))?;
        if let Some(rejected) = items
            .iter()
            .find(|tree| !info.is_valid_child(tree.root().model_type()))
        {
            return Err(ModelError::TypeNotAllowed {
                tag: ROOT_TAG.to_string(),
                model_type: rejected.root().model_type().to_string(),
            });
        }
        self.reset_with(items);
        Ok(())
    }

    fn reset_with(&mut self, items: Vec<ItemTree>) {
        self.notify(&ModelEvent::ModelAboutToBeReset);
        self.tree = ItemTree::new(root_item());
        let root = self.tree.root_id();
        for subtree in items {
            if let Err(err) = self.tree.insert_item(root, subtree, Some(ROOT_TAG), None) {
                log::warn!("{}: dropped item during reset: {err}", self.model_type);
            }
        }
        self.touch(ModelEvent::ModelReset);
    }

    fn touch(&mut self, event: ModelEvent) {
        self.revision += 1;
        self.notify(&event);
    }

    fn notify(&mut self, event: &ModelEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }
}

impl fmt::Debug for SessionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionModel")
            .field("model_type", &self.model_type)
            .field("items", &(self.tree.len() - 1))
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn root_item() -> SessionItem {
    let mut root = SessionItem::new(ROOT_ITEM_TYPE);
    // A fresh item has no tags, so registration cannot collide.
    let _ = root.register_tag(TagInfo::universal_tag(ROOT_TAG, Vec::<String>::new()), true);
    root
}
