use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use clientgen_core::config::{self, CONFIG_FILE_NAME, ClientgenConfig, ExtensionConfig};
use clientgen_core::model::{DefinitionKind, GenerationModel};
use clientgen_core::parse::{self, spec::OpenApiSpec};
use clientgen_core::transform::{ClientEmitter, ExtensionBundle};
use clientgen_core::{CodeGenerator, GeneratedFile};
use clientgen_typescript::TypeScriptGenerator;
use clientgen_typescript::type_mapper::{exception_ts, result_ts};

#[derive(Parser)]
#[command(
    name = "clientgen",
    about = "Typed TypeScript client generator for OpenAPI 3.x",
    version
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the client module from an OpenAPI description
    Generate {
        /// Path to the OpenAPI description (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path of the generated TypeScript file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an OpenAPI description and resolve every type and operation
    Validate {
        /// Path to the OpenAPI description
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the types and operations a run would generate
    Inspect {
        /// Path to the OpenAPI description
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Dump the complete generation model instead of a summary
        #[arg(long)]
        full: bool,
    },

    /// Initialize a new clientgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(&cli.config, input, output),

        Commands::Validate { input } => cmd_validate(&cli.config, &input),

        Commands::Inspect {
            input,
            format,
            full,
        } => cmd_inspect(&cli.config, &input, format, full),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "clientgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<ClientgenConfig> {
    let config = config::load_config(path)?;
    if config.is_none() {
        log::debug!("no {} found, using defaults", path.display());
    }
    Ok(config.unwrap_or_default())
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(parsed)
}

/// Read the extension code file (if configured) and merge it with inline
/// blocks from the config.
fn load_extensions(config: &ExtensionConfig) -> Result<ExtensionBundle> {
    let code = match &config.code_file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read extension code {path}"))?,
        ),
        None => None,
    };
    Ok(ExtensionBundle::from_config(config, code.as_deref()))
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// Generate the "do not edit" README.
fn readme_content(file_name: &str) -> String {
    format!(
        r#"# Generated Code - Do Not Edit

`{file_name}` is **auto-generated** by clientgen.
Any manual changes will be overwritten the next time `clientgen generate` is run.

To regenerate, run:
```
clientgen generate
```

To customize the generated output, edit your `{CONFIG_FILE_NAME}` configuration file.
Hand-written additions belong in the extension code file configured under `extensions.code_file`.
"#
    )
}

fn cmd_generate(
    config_path: &Path,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let spec = load_spec(&input)?;
    let extensions = load_extensions(&cfg.extensions)?;

    let file_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid output path {}", output.display()))?
        .to_string();
    let output_dir = output.parent().unwrap_or(Path::new("")).to_path_buf();

    eprintln!("Generating {} -> {}", input.display(), output.display());
    let files = TypeScriptGenerator::new(file_name.as_str())
        .generate(&spec, &cfg.settings(), &extensions)
        .with_context(|| format!("failed to generate from {}", input.display()))?;

    write_files(&output_dir, &files)?;

    // The project root keeps its own README.
    if output_dir.as_os_str().is_empty() {
        log::debug!("output is in the working directory, skipping README");
    } else {
        let readme_path = output_dir.join("README.md");
        fs::write(&readme_path, readme_content(&file_name))
            .with_context(|| format!("failed to write {}", readme_path.display()))?;
        eprintln!("  wrote {}", readme_path.display());
    }

    eprintln!(
        "\nThe generated file should not be edited manually - changes will be overwritten."
    );
    Ok(())
}

fn cmd_validate(config_path: &Path, input: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let parsed = load_spec(input)?;

    eprintln!(
        "Valid OpenAPI {} description: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    // Resolution failures only surface once every type and operation is built.
    let settings = cfg.settings();
    let extensions = ExtensionBundle::default();
    let model = ClientEmitter::new(&parsed, &settings, &extensions).build_models()?;
    let operations: usize = model.clients.iter().map(|c| c.operations.len()).sum();
    eprintln!("  Clients: {}", model.clients.len());
    eprintln!("  Operations: {operations}");
    eprintln!("  Types: {}", model.types.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(config_path: &Path, input: &Path, format: InspectFormat, full: bool) -> Result<()> {
    let cfg = load_config(config_path)?;
    let spec = load_spec(input)?;
    let settings = cfg.settings();
    let extensions = load_extensions(&cfg.extensions)?;
    let model = ClientEmitter::new(&spec, &settings, &extensions).build_models()?;

    let value = if full {
        serde_json::to_value(&model)?
    } else {
        build_inspect_summary(&spec, &model)
    };

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&value)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&value)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(spec: &OpenApiSpec, model: &GenerationModel) -> serde_json::Value {
    let types: Vec<serde_json::Value> = model
        .types
        .iter()
        .map(|t| {
            let (kind, base) = match &t.kind {
                DefinitionKind::Object(object) => {
                    ("object", object.base.as_ref().map(|b| b.name.clone()))
                }
                DefinitionKind::Enum(_) => ("enum", None),
            };
            serde_json::json!({
                "name": t.name,
                "kind": kind,
                "style": t.style,
                "base": base,
            })
        })
        .collect();

    let clients: Vec<serde_json::Value> = model
        .clients
        .iter()
        .map(|client| {
            let operations: Vec<serde_json::Value> = client
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "name": op.name.camel_case,
                        "method": op.method.as_str(),
                        "path": op.path,
                        "result": result_ts(op.result_type.as_ref()),
                        "exception": exception_ts(&op.exception_type),
                    })
                })
                .collect();
            serde_json::json!({
                "name": client.name,
                "class_name": client.class_name,
                "base_url": client.base_url,
                "operations": operations,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "types": types,
        "clients": clients,
    })
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
