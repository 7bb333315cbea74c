//! Layer and material items.
//! 多層膜樣品與材料項目。

use mvvm_model::{ExternalProperty, ItemFactory, ModelResult, RealLimits, SessionItem, TagInfo};

pub const LAYER_TYPE: &str = "Layer";
pub const MULTI_LAYER_TYPE: &str = "MultiLayer";
pub const MATERIAL_TYPE: &str = "Material";
pub const MATERIAL_CONTAINER_TYPE: &str = "MaterialContainer";

pub const P_NAME: &str = "P_NAME";
pub const P_MATERIAL: &str = "P_MATERIAL";
pub const P_THICKNESS: &str = "P_THICKNESS";
pub const P_NREPETITIONS: &str = "P_NREPETITIONS";
pub const P_COLOR: &str = "P_COLOR";
pub const P_SLD_REAL: &str = "P_SLD_REAL";
pub const P_SLD_IMAG: &str = "P_SLD_IMAG";

pub const T_LAYERS: &str = "T_LAYERS";
pub const T_MATERIALS: &str = "T_MATERIALS";

pub const DEFAULT_THICKNESS: f64 = 42.0;

/// Layer: name, material link and a non-negative thickness.
pub fn layer_item() -> SessionItem {
    let mut item = SessionItem::new(LAYER_TYPE);
    if let Ok(slot) = item.add_property(P_NAME, "Layer") {
        slot.set_display_name("Name");
    }
    if let Ok(slot) = item.add_property(P_MATERIAL, ExternalProperty::undefined()) {
        slot.set_display_name("Material");
    }
    if let Ok(slot) = item.add_property(P_THICKNESS, DEFAULT_THICKNESS) {
        slot.set_display_name("Thickness")
            .set_limits(RealLimits::nonnegative());
    }
    item
}

/// Stack of layers and nested stacks, repeated `P_NREPETITIONS` times.  
/// 可重複的層堆疊，子項目可為 Layer 或巢狀 MultiLayer。
pub fn multi_layer_item() -> SessionItem {
    let mut item = SessionItem::new(MULTI_LAYER_TYPE);
    if let Ok(slot) = item.add_property(P_NREPETITIONS, 1) {
        slot.set_display_name("Nr.");
    }
    // A fresh item has no tags, so registration cannot collide.
    let _ = item.register_tag(
        TagInfo::universal_tag(T_LAYERS, [MULTI_LAYER_TYPE, LAYER_TYPE]),
        true,
    );
    item
}

pub fn material_item() -> SessionItem {
    let mut item = SessionItem::new(MATERIAL_TYPE);
    if let Ok(slot) = item.add_property(P_NAME, "Material") {
        slot.set_display_name("Name");
    }
    if let Ok(slot) = item.add_property(P_COLOR, ExternalProperty::undefined()) {
        slot.set_display_name("Color");
    }
    if let Ok(slot) = item.add_property(P_SLD_REAL, 0.0) {
        slot.set_display_name("SLD, real");
    }
    if let Ok(slot) = item.add_property(P_SLD_IMAG, 0.0) {
        slot.set_display_name("SLD, imag");
    }
    item
}

pub fn material_container_item() -> SessionItem {
    let mut item = SessionItem::new(MATERIAL_CONTAINER_TYPE);
    // A fresh item has no tags, so registration cannot collide.
    let _ = item.register_tag(TagInfo::universal_tag(T_MATERIALS, [MATERIAL_TYPE]), true);
    item
}

/// Builds a material with the given name, display color and scattering length density.
pub fn create_material(
    name: &str,
    color: &str,
    sld_real: f64,
    sld_imag: f64,
) -> ModelResult<SessionItem> {
    let mut item = material_item();
    item.set_property(P_NAME, name)?;
    item.set_property(P_COLOR, ExternalProperty::new(name, color, ""))?;
    item.set_property(P_SLD_REAL, sld_real)?;
    item.set_property(P_SLD_IMAG, sld_imag)?;
    Ok(item)
}

/// Link stored in a layer's `P_MATERIAL`, identifying the material by name.
pub fn material_link(material: &SessionItem) -> ModelResult<ExternalProperty> {
    let name = material.property::<String>(P_NAME)?;
    let color = material.property::<ExternalProperty>(P_COLOR)?.color;
    Ok(ExternalProperty::new(name.clone(), color, name))
}

pub fn register_sample_items(factory: &mut ItemFactory) {
    factory.register_type(LAYER_TYPE, layer_item);
    factory.register_type(MULTI_LAYER_TYPE, multi_layer_item);
}

pub fn register_material_items(factory: &mut ItemFactory) {
    factory.register_type(MATERIAL_TYPE, material_item);
    factory.register_type(MATERIAL_CONTAINER_TYPE, material_container_item);
}
