use std::error::Error;
use std::fs;

use mvvm_layers::items::{P_MATERIAL, P_NAME, P_THICKNESS, T_LAYERS};
use mvvm_layers::LayerModels;
use mvvm_model::ExternalProperty;
use mvvm_project::ProjectManager;
use serde_json::Value;
use tempfile::tempdir;

/// 層編輯器專案存檔後重新開啟，樣品與材料皆還原。 /
/// A saved layer project reopens with the same sample and materials.
#[test]
fn layer_project_round_trip() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let mut manager = ProjectManager::new(LayerModels::new()?);
    manager.models_mut().add_layer("Top", 0.1 + 0.2, Some("Air"))?;
    manager.models_mut().add_layer("Substrate", 1000.0, Some("Substrate"))?;
    assert!(manager.is_modified());
    manager.save_project_as(dir.path())?;

    let sample: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("samplemodel.json"))?)?;
    let layer = &sample["items"][0]["itemTags"]["containers"][0]["items"][0];
    assert_eq!(layer["model"], "Layer");
    assert_eq!(layer["itemData"][2]["role"], P_THICKNESS);
    assert!(dir.path().join("materialmodel.json").is_file());

    let mut reopened = ProjectManager::new(LayerModels::new()?);
    reopened.open_existing_project(dir.path())?;
    let models = reopened.models();
    let multilayer = models.sample.top_items()[0].id();
    let layers = models.sample.tree().get_items(multilayer, T_LAYERS);
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].property::<String>(P_NAME)?, "Top");
    assert_eq!(
        layers[0].property::<f64>(P_THICKNESS)?.to_bits(),
        (0.1f64 + 0.2).to_bits()
    );
    assert_eq!(
        layers[1].property::<ExternalProperty>(P_MATERIAL)?.identifier,
        "Substrate"
    );
    assert_eq!(models.materials.top_items().len(), 1);
    assert!(!reopened.is_modified());
    Ok(())
}

/// 含無限大與 NaN 的專案仍可存檔並重新開啟。 /
/// A project holding infinite and NaN reals saves and reopens intact.
#[test]
fn non_finite_reals_reopen() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let mut manager = ProjectManager::new(LayerModels::new()?);
    manager.models_mut().add_layer("Infinite", f64::INFINITY, None)?;
    let odd = manager.models_mut().add_layer("Odd", 1.0, None)?;
    manager
        .models_mut()
        .sample
        .set_property(odd, P_THICKNESS, f64::NAN)?;
    manager.save_project_as(dir.path())?;

    let mut reopened = ProjectManager::new(LayerModels::new()?);
    reopened.open_existing_project(dir.path())?;
    let models = reopened.models();
    let multilayer = models.sample.top_items()[0].id();
    let layers = models.sample.tree().get_items(multilayer, T_LAYERS);
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].property::<f64>(P_THICKNESS)?, f64::INFINITY);
    assert!(layers[1].property::<f64>(P_THICKNESS)?.is_nan());
    assert!(!reopened.is_modified());
    Ok(())
}
