use thiserror::Error;

use crate::item::ItemId;
use crate::variant::VariantKind;

/// Errors raised by item, tree, factory, model and serialization operations.
/// 項目樹、工廠、模型與序列化操作可能拋出的錯誤。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("model type '{0}' is not registered in the item factory")]
    UnknownType(String),
    #[error("property role '{0}' already exists")]
    DuplicateRole(String),
    #[error("tag '{0}' already exists")]
    DuplicateTag(String),
    #[error("property role '{0}' not found")]
    UnknownRole(String),
    #[error("tag '{0}' not found")]
    UnknownTag(String),
    #[error("no default tag registered; an explicit tag is required")]
    NoDefaultTag,
    #[error("property '{role}' holds {expected}, got {found}")]
    TypeMismatch {
        role: String,
        expected: VariantKind,
        found: VariantKind,
    },
    #[error("property '{0}' is not editable")]
    NotEditable(String),
    #[error("model type '{model_type}' is not allowed in tag '{tag}'")]
    TypeNotAllowed { tag: String, model_type: String },
    #[error("tag '{tag}' is full (max {max} items)")]
    CapacityExceeded { tag: String, max: usize },
    #[error("tag '{tag}' must keep at least {min} items")]
    BelowMinimum { tag: String, min: usize },
    #[error("row {row} is out of range for tag '{tag}' holding {len} items")]
    IndexOutOfRange { tag: String, row: usize, len: usize },
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("document holds model '{found}', expected '{expected}'")]
    ModelTypeMismatch { expected: String, found: String },
}

impl ModelError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ModelError::MalformedDocument(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
