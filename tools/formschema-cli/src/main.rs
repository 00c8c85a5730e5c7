use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use formschema::form::{ChildField, FieldLayout, FieldProps, ObjectField, Registry, UiSchema};
use formschema::schema::{DefaultStateComputer, SchemaParser, SchemaResolver};
use formschema::{EngineConfig, Error, Result};
use log::{debug, error};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a JSON engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(clap::Args)]
struct Inputs {
    /// JSON Schema document; may carry `definitions` or `$defs`
    #[arg(short, long)]
    schema: PathBuf,

    /// Existing form data
    #[arg(short, long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema with its top-level references and allOf expanded
    Resolve {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the default form state merged with the given data
    Defaults {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the ordered object layout of the root field
    Layout {
        #[command(flatten)]
        inputs: Inputs,

        /// UI schema carrying `ui:order` hints
        #[arg(short, long)]
        ui_schema: Option<PathBuf>,
    },
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::SchemaError(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

fn read_optional_json(path: Option<&PathBuf>) -> Result<Option<Value>> {
    path.map(|p| read_json(p)).transpose()
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| Error::ConfigError(format!("Cannot read {}: {}", path.display(), e)))?;
            EngineConfig::from_json_str(&text)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn child_to_json(child: &ChildField) -> Value {
    json!({
        "name": child.name,
        "required": child.required,
        "schema": child.schema,
        "uiSchema": child.ui_schema,
        "formData": child.form_data,
    })
}

fn layout_to_json(layout: &FieldLayout) -> Value {
    match layout {
        FieldLayout::Fields { title, description, children } => json!({
            "title": title,
            "description": description,
            "children": children.iter().map(child_to_json).collect::<Vec<_>>(),
        }),
        FieldLayout::ConfigError(notice) => json!({
            "configError": notice.to_string(),
            "schema": notice.schema_json,
        }),
    }
}

fn run(cli: Cli) -> Result<Value> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Resolve { inputs } => {
            let (schema, definitions) = SchemaParser::new().parse_document(&read_json(&inputs.schema)?)?;
            debug!("Resolving against {} definition(s)", definitions.len());
            let resolved = SchemaResolver::with_config(&definitions, config).resolve(&schema)?;
            Ok(resolved.to_value())
        }
        Commands::Defaults { inputs } => {
            let (schema, definitions) = SchemaParser::new().parse_document(&read_json(&inputs.schema)?)?;
            let data = read_optional_json(inputs.data.as_ref())?;
            let state = DefaultStateComputer::with_config(&definitions, config).compute(&schema, data.as_ref())?;
            Ok(state.unwrap_or(Value::Null))
        }
        Commands::Layout { inputs, ui_schema } => {
            let (schema, definitions) = SchemaParser::new().parse_document(&read_json(&inputs.schema)?)?;
            let ui_schema = match read_optional_json(ui_schema.as_ref())? {
                Some(value) => UiSchema::from_value(value)?,
                None => UiSchema::new(),
            };

            let mut props = FieldProps::root(schema, Registry::with_config(&definitions, config))
                .with_ui_schema(ui_schema);
            props.form_data = read_optional_json(inputs.data.as_ref())?;

            let field = ObjectField::new(props)?;
            Ok(layout_to_json(&field.layout()))
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).and_then(|output| serde_json::to_string_pretty(&output).map_err(Error::from)) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
