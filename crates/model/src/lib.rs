//! Session item tree: typed properties, tagged child containers, a change-notifying model and
//! its JSON persistence.
//! 會話項目樹：具型別屬性、標籤容器、可通知變更的模型與 JSON 序列化。

mod error;
mod factory;
mod item;
mod model;
mod tag;
mod tree;
mod variant;

pub mod serialization;
pub mod standard_items;

pub use error::{ModelError, ModelResult};
pub use factory::{ItemConstructor, ItemFactory};
pub use item::{ItemId, PropertySlot, SessionItem};
pub use model::{ModelCallback, ModelEvent, SessionModel, SubscriptionId, ROOT_ITEM_TYPE, ROOT_TAG};
pub use serialization::{
    json_string_to_model, model_to_json_string, JsonItemConverter, JsonItemFormatAssistant,
    JsonModelConverter,
};
pub use tag::{ItemContainer, TagInfo, TaggedItems};
pub use tree::{ItemTree, TagRow};
pub use variant::{ComboProperty, ExternalProperty, FromVariant, RealLimits, Variant, VariantKind};
