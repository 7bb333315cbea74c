use std::collections::HashMap;
use std::fmt;

use crate::error::{ModelError, ModelResult};
use crate::item::{ItemId, SessionItem};

/// Resolved position of a child: tag name plus row inside that tag.
/// 子項目的位置：標籤名稱與列索引。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagRow {
    pub tag: String,
    pub row: usize,
}

impl TagRow {
    pub fn new(tag: impl Into<String>, row: usize) -> Self {
        Self {
            tag: tag.into(),
            row,
        }
    }
}

impl fmt::Display for TagRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tag, self.row)
    }
}

/// Owning arena of one item subtree. Nodes link to each other by [`ItemId`]; the tree is the only
/// owner, so handing a subtree to another tree means moving the whole `ItemTree`.
/// 單一項目子樹的擁有者；節點之間以 [`ItemId`] 互相連結。
#[derive(Debug, PartialEq)]
pub struct ItemTree {
    root: ItemId,
    items: HashMap<ItemId, SessionItem>,
}

impl ItemTree {
    pub fn new(root: SessionItem) -> Self {
        let root_id = root.id();
        let mut items = HashMap::new();
        items.insert(root_id, root);
        Self {
            root: root_id,
            items,
        }
    }

    pub fn root_id(&self) -> ItemId {
        self.root
    }

    pub fn root(&self) -> &SessionItem {
        &self.items[&self.root]
    }

    /// Mutable access to the root item (property values, tags). Structural changes go through
    /// [`ItemTree::insert_item`] and [`ItemTree::take_item`].
    pub fn root_mut(&mut self) -> &mut SessionItem {
        let root = self.root;
        self.item_entry(root)
    }

    pub fn item(&self, id: ItemId) -> Option<&SessionItem> {
        self.items.get(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut SessionItem> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of items in the tree, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_entry(&mut self, id: ItemId) -> &mut SessionItem {
        self.items
            .get_mut(&id)
            .unwrap_or_else(|| panic!("item {id} is linked but not stored"))
    }

    fn require(&self, id: ItemId) -> ModelResult<&SessionItem> {
        self.item(id).ok_or(ModelError::ItemNotFound(id))
    }

    /// Inserts `subtree` under `parent`. `tag` defaults to the parent's default tag and `row`
    /// defaults to appending. Nothing changes when a check fails.
    /// 將子樹插入父項目之下；檢查失敗時不做任何變更。
    pub fn insert_item(
        &mut self,
        parent: ItemId,
        subtree: ItemTree,
        tag: Option<&str>,
        row: Option<usize>,
    ) -> ModelResult<TagRow> {
        let (tag, row) = self.check_insert(parent, subtree.root().model_type(), tag, row, None)?;
        self.attach(parent, subtree, &tag, row);
        Ok(TagRow::new(tag, row))
    }

    /// Detaches the child at `tag`/`row` of `parent`, returning it with all its descendants.
    /// 取出指定位置的子項目及其所有後代，所有權交還呼叫端。
    pub fn take_item(&mut self, parent: ItemId, tag: &str, row: usize) -> ModelResult<ItemTree> {
        let child = self.check_take(parent, tag, row)?;
        Ok(self.detach(parent, tag, row, child))
    }

    pub fn get_item(&self, parent: ItemId, tag: &str, row: usize) -> Option<&SessionItem> {
        let id = self.item(parent)?.tags().container(tag)?.item_at(row)?;
        self.item(id)
    }

    /// Children of `parent` in `tag`, in order. Empty when either is unknown.
    pub fn get_items(&self, parent: ItemId, tag: &str) -> Vec<&SessionItem> {
        self.item(parent)
            .map(|item| {
                item.child_ids(tag)
                    .iter()
                    .filter_map(|id| self.item(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Children of `parent` across all of its tags.
    pub fn children(&self, parent: ItemId) -> Vec<ItemId> {
        self.item(parent)
            .map(|item| item.tags().all_items())
            .unwrap_or_default()
    }

    /// Every item below `id`, depth first, excluding `id` itself.
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut result = Vec::new();
        let mut stack = self.children(id);
        stack.reverse();
        while let Some(next) = stack.pop() {
            result.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        result
    }

    pub fn is_ancestor_of(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = self.item(id).and_then(SessionItem::parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.item(parent).and_then(SessionItem::parent);
        }
        false
    }

    /// Position of `id` inside its parent.
    pub fn tag_row_of(&self, id: ItemId) -> Option<TagRow> {
        let parent = self.item(id)?.parent()?;
        let (tag, row) = self.item(parent)?.tags().tag_row_of(id)?;
        Some(TagRow::new(tag, row))
    }

    /// All items of the given model type, in depth-first order starting at the root.
    pub fn find_by_type(&self, model_type: &str) -> Vec<ItemId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|id| {
                self.item(*id)
                    .map_or(false, |item| item.model_type() == model_type)
            })
            .collect()
    }

    /// Validates an insertion of an item of `model_type`. `moving` names an item of this tree
    /// that will be detached first, so it does not count against the target capacity.
    pub(crate) fn check_insert(
        &self,
        parent: ItemId,
        model_type: &str,
        tag: Option<&str>,
        row: Option<usize>,
        moving: Option<ItemId>,
    ) -> ModelResult<(String, usize)> {
        let parent_item = self.require(parent)?;
        let tag = parent_item.tags().resolve(tag)?;
        let container = parent_item
            .tags()
            .container(tag)
            .ok_or_else(|| ModelError::UnknownTag(tag.to_string()))?;
        let pending_removal = moving.map_or(false, |id| container.index_of(id).is_some());
        let row = container.check_insert(model_type, row, pending_removal)?;
        Ok((tag.to_string(), row))
    }

    pub(crate) fn check_take(&self, parent: ItemId, tag: &str, row: usize) -> ModelResult<ItemId> {
        self.require(parent)?
            .tags()
            .container(tag)
            .ok_or_else(|| ModelError::UnknownTag(tag.to_string()))?
            .check_take(row)
    }

    pub(crate) fn attach(&mut self, parent: ItemId, subtree: ItemTree, tag: &str, row: usize) {
        let ItemTree { root, items } = subtree;
        self.items.extend(items);
        self.item_entry(root).set_parent(Some(parent));
        if let Some(container) = self.item_entry(parent).tags_mut().container_mut(tag) {
            container.insert(row, root);
        }
    }

    pub(crate) fn detach(
        &mut self,
        parent: ItemId,
        tag: &str,
        row: usize,
        child: ItemId,
    ) -> ItemTree {
        if let Some(container) = self.item_entry(parent).tags_mut().container_mut(tag) {
            container.remove(row);
        }
        let mut items = HashMap::new();
        for id in std::iter::once(child).chain(self.descendants(child)) {
            if let Some(item) = self.items.remove(&id) {
                items.insert(id, item);
            }
        }
        if let Some(root) = items.get_mut(&child) {
            root.set_parent(None);
        }
        ItemTree { root: child, items }
    }
}

impl From<SessionItem> for ItemTree {
    fn from(item: SessionItem) -> Self {
        ItemTree::new(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagInfo;

    fn multilayer() -> SessionItem {
        let mut item = SessionItem::new("MultiLayer");
        item.register_tag(
            TagInfo::universal_tag("T_LAYERS", ["MultiLayer", "Layer"]),
            true,
        )
        .unwrap();
        item
    }

    fn layer() -> ItemTree {
        let mut item = SessionItem::new("Layer");
        item.add_property("P_THICKNESS", 42.0).unwrap();
        ItemTree::new(item)
    }

    #[test]
    fn insert_into_default_tag_and_reparent() {
        let mut tree = ItemTree::new(multilayer());
        let root = tree.root_id();
        let first = layer();
        let first_id = first.root_id();
        let pos = tree.insert_item(root, first, None, None).unwrap();
        assert_eq!(pos, TagRow::new("T_LAYERS", 0));
        assert_eq!(tree.item(first_id).unwrap().parent(), Some(root));
        assert_eq!(tree.tag_row_of(first_id), Some(TagRow::new("T_LAYERS", 0)));

        let nested = ItemTree::new(multilayer());
        let nested_id = nested.root_id();
        let pos = tree.insert_item(root, nested, Some("T_LAYERS"), None).unwrap();
        assert_eq!(pos.row, 1);
        let second = layer();
        let second_id = second.root_id();
        tree.insert_item(nested_id, second, None, None).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.descendants(root), vec![first_id, nested_id, second_id]);
        assert!(tree.is_ancestor_of(root, second_id));
        assert!(!tree.is_ancestor_of(second_id, root));
        assert_eq!(tree.find_by_type("Layer"), vec![first_id, second_id]);
    }

    #[test]
    fn insertion_order_is_stable() {
        let mut tree = ItemTree::new(multilayer());
        let root = tree.root_id();
        let a = layer();
        let a_id = a.root_id();
        let b = layer();
        let b_id = b.root_id();
        let c = layer();
        let c_id = c.root_id();
        tree.insert_item(root, a, None, None).unwrap();
        tree.insert_item(root, b, None, None).unwrap();
        tree.insert_item(root, c, None, Some(0)).unwrap();
        let ids: Vec<ItemId> = tree
            .get_items(root, "T_LAYERS")
            .iter()
            .map(|item| item.id())
            .collect();
        assert_eq!(ids, vec![c_id, a_id, b_id]);
        assert_eq!(tree.get_item(root, "T_LAYERS", 1).unwrap().id(), a_id);
        assert!(tree.get_item(root, "T_LAYERS", 3).is_none());
    }

    #[test]
    fn disallowed_type_leaves_tree_unchanged() {
        let mut tree = ItemTree::new(multilayer());
        let root = tree.root_id();
        let err = tree
            .insert_item(root, ItemTree::new(SessionItem::new("Detector")), None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::TypeNotAllowed {
                tag: "T_LAYERS".into(),
                model_type: "Detector".into()
            }
        );
        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn insert_errors() {
        let mut tree = ItemTree::new(SessionItem::new("Plain"));
        let root = tree.root_id();
        assert_eq!(
            tree.insert_item(root, layer(), None, None).unwrap_err(),
            ModelError::NoDefaultTag
        );
        assert_eq!(
            tree.insert_item(root, layer(), Some("T_NONE"), None)
                .unwrap_err(),
            ModelError::UnknownTag("T_NONE".into())
        );
        let mut tree = ItemTree::new(multilayer());
        let root = tree.root_id();
        assert!(matches!(
            tree.insert_item(root, layer(), None, Some(1)),
            Err(ModelError::IndexOutOfRange { row: 1, len: 0, .. })
        ));
    }

    #[test]
    fn take_item_returns_whole_subtree() {
        let mut tree = ItemTree::new(multilayer());
        let root = tree.root_id();
        let nested = ItemTree::new(multilayer());
        let nested_id = nested.root_id();
        tree.insert_item(root, nested, None, None).unwrap();
        let inner = layer();
        let inner_id = inner.root_id();
        tree.insert_item(nested_id, inner, None, None).unwrap();

        let taken = tree.take_item(root, "T_LAYERS", 0).unwrap();
        assert_eq!(taken.root_id(), nested_id);
        assert_eq!(taken.root().parent(), None);
        assert_eq!(taken.len(), 2);
        assert!(taken.contains(inner_id));
        assert_eq!(tree.len(), 1);
        assert!(tree.item(inner_id).is_none());

        assert!(matches!(
            tree.take_item(root, "T_LAYERS", 0),
            Err(ModelError::IndexOutOfRange { row: 0, len: 0, .. })
        ));
    }

    #[test]
    fn taken_subtree_can_be_inserted_elsewhere() {
        let mut source = ItemTree::new(multilayer());
        let source_root = source.root_id();
        source.insert_item(source_root, layer(), None, None).unwrap();
        let moved = source.take_item(source_root, "T_LAYERS", 0).unwrap();
        let moved_id = moved.root_id();

        let mut target = ItemTree::new(multilayer());
        let target_root = target.root_id();
        target.insert_item(target_root, moved, None, None).unwrap();
        assert_eq!(target.item(moved_id).unwrap().parent(), Some(target_root));
        assert_eq!(
            target
                .item(moved_id)
                .unwrap()
                .property::<f64>("P_THICKNESS")
                .unwrap(),
            42.0
        );
    }
}
