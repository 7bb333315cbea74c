use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::{ModelError, ModelResult};
use crate::item::SessionItem;

/// Constructor registered for a model type.
pub type ItemConstructor = Box<dyn Fn() -> SessionItem>;

/// Registry creating items from their model-type name.
/// 依模型型別名稱建立項目的註冊表。
#[derive(Default)]
pub struct ItemFactory {
    constructors: BTreeMap<String, ItemConstructor>,
}

impl ItemFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory pre-loaded with the standard axis items.
    pub fn with_standard_items() -> Self {
        let mut factory = Self::new();
        crate::standard_items::register_standard_items(&mut factory);
        factory
    }

    /// Registers `constructor` under `model_type`. A later registration replaces an earlier one.
    /// 註冊建構函式；重複註冊時以最後一次為準。
    pub fn register_type<F>(&mut self, model_type: impl Into<String>, constructor: F)
    where
        F: Fn() -> SessionItem + 'static,
    {
        let model_type = model_type.into();
        if self
            .constructors
            .insert(model_type.clone(), Box::new(constructor))
            .is_some()
        {
            debug!("item factory: constructor for '{model_type}' replaced");
        }
    }

    /// Creates a fresh item of the given type.
    pub fn create_item(&self, model_type: &str) -> ModelResult<SessionItem> {
        self.constructors
            .get(model_type)
            .map(|constructor| constructor())
            .ok_or_else(|| ModelError::UnknownType(model_type.to_string()))
    }

    pub fn is_registered(&self, model_type: &str) -> bool {
        self.constructors.contains_key(model_type)
    }

    /// Registered model types, sorted.
    pub fn registered_types(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ItemFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemFactory")
            .field("types", &self.registered_types())
            .finish()
    }
}
