use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use mvvm_layers::items::DEFAULT_THICKNESS;
use mvvm_layers::LayerModels;
use mvvm_model::{ItemId, JsonItemFormatAssistant, SessionModel};
use mvvm_project::{ApplicationModels, ProjectManager, ProjectSettings};
use serde_json::Value as SerdeValue;

#[derive(Parser)]
#[command(
    name = "mvvm-cli",
    about = "Inspect and edit layer-editor projects",
    author,
    version
)]
struct Cli {
    /// 以單行 JSON 寫入專案檔。 / Write project files as single-line JSON.
    #[arg(long, global = true)]
    compact: bool,
    /// 顯示除錯訊息。 / Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// 專案設定檔（JSON）。 / Project settings file (JSON).
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 在目錄中建立新專案。 / Create a new project in a directory.
    New {
        dir: PathBuf,
    },
    /// 列出專案中的模型與項目。 / Print the models and items of a project.
    Show {
        dir: PathBuf,
    },
    /// 在樣品中新增一層並存檔。 / Append a layer to the sample and save.
    AddLayer {
        dir: PathBuf,
        /// 層名稱。 / Layer name.
        #[arg(long, default_value = "Layer")]
        name: String,
        /// 層厚度。 / Layer thickness.
        #[arg(long, default_value_t = DEFAULT_THICKNESS)]
        thickness: f64,
        /// 連結的材料名稱。 / Name of the material to link.
        #[arg(long)]
        material: Option<String>,
    },
    /// 檢查 JSON 檔是否為合法的模型或項目文件。 /
    /// Check that a JSON file is a valid model or item document.
    Validate {
        file: PathBuf,
    },
    /// 顯示專案標題與各模型檔案。 / Show the project title and its model files.
    Status {
        dir: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::New { dir } => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            let mut manager = new_manager(settings)?;
            manager
                .create_new_project(&dir)
                .with_context(|| format!("failed to create project in {}", dir.display()))?;
            println!("Created project in {}", dir.display());
        }
        Commands::Show { dir } => {
            let manager = open_project(&dir, settings)?;
            for model in manager.models().persistent_models() {
                print_model(model);
            }
        }
        Commands::AddLayer {
            dir,
            name,
            thickness,
            material,
        } => {
            if !thickness.is_finite() || thickness < 0.0 {
                bail!("thickness must be a finite non-negative number (got {thickness})");
            }
            let mut manager = open_project(&dir, settings)?;
            manager
                .models_mut()
                .add_layer(&name, thickness, material.as_deref())
                .context("failed to add layer")?;
            manager
                .save_current_project()
                .with_context(|| format!("failed to save {}", dir.display()))?;
            println!("Added layer '{name}' to {}", dir.display());
        }
        Commands::Validate { file } => validate_file(&file)?,
        Commands::Status { dir } => {
            let manager = open_project(&dir, settings)?;
            println!("Project: {}", manager.title());
            for model in manager.models().persistent_models() {
                println!(
                    "  {} -> {} ({} top-level items)",
                    model.model_type(),
                    manager.settings().model_file_name(model.model_type()),
                    model.top_items().len()
                );
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn load_settings(cli: &Cli) -> Result<ProjectSettings> {
    let mut settings = match &cli.settings {
        Some(path) => ProjectSettings::load(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?,
        None => ProjectSettings::default(),
    };
    if cli.compact {
        settings.pretty_json = false;
    }
    debug!("project settings: {settings:?}");
    Ok(settings)
}

fn new_manager(settings: ProjectSettings) -> Result<ProjectManager<LayerModels>> {
    let models = LayerModels::new().context("failed to build default models")?;
    Ok(ProjectManager::with_settings(models, settings))
}

fn open_project(dir: &Path, settings: ProjectSettings) -> Result<ProjectManager<LayerModels>> {
    let mut manager = new_manager(settings)?;
    manager
        .open_existing_project(dir)
        .with_context(|| format!("failed to open project {}", dir.display()))?;
    Ok(manager)
}

fn print_model(model: &SessionModel) {
    println!("{}", model.model_type());
    for item in model.top_items() {
        print_item(model, item.id(), 1);
    }
}

fn print_item(model: &SessionModel, id: ItemId, depth: usize) {
    let Some(item) = model.item(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    println!("{indent}{}", item.model_type());
    for slot in item.properties() {
        println!("{indent}  {} = {}", slot.display_name(), slot.value());
    }
    for child in model.tree().children(id) {
        print_item(model, child, depth + 1);
    }
}

fn validate_file(file: &Path) -> Result<()> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let json: SerdeValue = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let assistant = JsonItemFormatAssistant::new();
    let kind = if json.get("items").is_some() {
        assistant.validate_model(&json)?;
        "model"
    } else {
        assistant.validate_item(&json)?;
        "item"
    };
    println!("{}: valid {kind} document", file.display());
    Ok(())
}
