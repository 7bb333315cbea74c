use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("mvvm-cli")?)
}

/// 建立專案、加入兩層、再列出內容。 /
/// Creates a project, adds two layers and prints the result.
#[test]
fn new_add_layer_show() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("alpha");
    let project_arg = project.to_str().unwrap();

    cli()?
        .args(["new", project_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"));
    assert!(project.join("samplemodel.json").is_file());
    assert!(project.join("materialmodel.json").is_file());

    cli()?
        .args([
            "add-layer",
            project_arg,
            "--name",
            "Top",
            "--thickness",
            "12.5",
            "--material",
            "Air",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added layer 'Top'"));
    cli()?
        .args(["add-layer", project_arg, "--name", "Bottom"])
        .assert()
        .success();

    let sample: Value =
        serde_json::from_str(&fs::read_to_string(project.join("samplemodel.json"))?)?;
    let layers = &sample["items"][0]["itemTags"]["containers"][0]["items"];
    assert_eq!(layers.as_array().map(Vec::len), Some(2));
    assert_eq!(layers[0]["itemData"][2]["value"]["value"], 12.5);
    assert_eq!(layers[1]["itemData"][2]["value"]["value"], 42.0);

    cli()?
        .args(["show", project_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("SampleModel"))
        .stdout(predicate::str::contains("Name = \"Top\""))
        .stdout(predicate::str::contains("Material = Air"));
    Ok(())
}

#[test]
fn status_reports_title_and_files() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("beta");
    let project_arg = project.to_str().unwrap();
    cli()?.args(["new", project_arg]).assert().success();

    cli()?
        .args(["status", project_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: beta"))
        .stdout(predicate::str::contains("samplemodel.json"))
        .stdout(predicate::str::contains(
            "MaterialModel -> materialmodel.json (1 top-level items)",
        ));
    Ok(())
}

#[test]
fn compact_flag_writes_single_line() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("gamma");
    cli()?
        .args(["--compact", "new", project.to_str().unwrap()])
        .assert()
        .success();
    let contents = fs::read_to_string(project.join("materialmodel.json"))?;
    assert!(!contents.trim_end().contains('\n'));
    Ok(())
}

#[test]
fn settings_file_changes_suffix() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"file_suffix": ".mvvm"}"#)?;
    let project = dir.path().join("delta");
    cli()?
        .args([
            "--settings",
            settings.to_str().unwrap(),
            "new",
            project.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(project.join("samplemodel.mvvm").is_file());
    Ok(())
}

#[test]
fn validate_accepts_model_and_rejects_garbage() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("epsilon");
    cli()?.args(["new", project.to_str().unwrap()]).assert().success();

    cli()?
        .args(["validate", project.join("materialmodel.json").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid model document"));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, r#"{"model": "SampleModel", "items": [{"model": "Layer"}]}"#)?;
    cli()?
        .args(["validate", broken.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("$.items[0]: not a session item object"));
    Ok(())
}

#[test]
fn show_missing_project_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    cli()?
        .args(["show", dir.path().join("missing").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn negative_thickness_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("zeta");
    let project_arg = project.to_str().unwrap();
    cli()?.args(["new", project_arg]).assert().success();
    cli()?
        .args(["add-layer", project_arg, "--thickness=-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("finite non-negative"));
    Ok(())
}

#[test]
fn non_finite_thickness_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("eta");
    let project_arg = project.to_str().unwrap();
    cli()?.args(["new", project_arg]).assert().success();
    for value in ["NaN", "inf", "-inf"] {
        cli()?
            .args(["add-layer", project_arg, &format!("--thickness={value}")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("finite non-negative"));
    }
    cli()?.args(["show", project_arg]).assert().success();
    Ok(())
}
