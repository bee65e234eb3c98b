//! NF-010: CLI subcommands — init, generate, validate, inspect.

use crate::core::builder::InfrastructureBuilder;
use crate::core::config_store::ConfigStore;
use crate::core::error::{Error, Result};
use crate::core::factory::NullResourceFactory;
use crate::core::types::{GenerateConfig, TRIGGERS_KEY};
use crate::core::{hasher, output, parser};
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// Config written by `init` and used by `generate` when no file exists.
pub const DEFAULT_CONFIG: &str = r#"env_name: desarrollo-local
output: terraform/main.tf.json
stamp_triggers: false

settings:
  proyecto: patrones_iac_locales

fleet:
  base_name: placeholder
  count: 15

custom_resources:
  - name: finalizador
    triggers:
      nota: "Recurso compuesto generado dinámicamente en tiempo de ejecución"
"#;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new nullforge project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Generate a Terraform JSON document
    Generate {
        /// Path to nullforge.yaml (built-in defaults if absent)
        #[arg(short, long, default_value = "nullforge.yaml")]
        file: PathBuf,

        /// Override the environment name
        #[arg(long)]
        env: Option<String>,

        /// Override the fleet size
        #[arg(short, long)]
        count: Option<usize>,

        /// Override the output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stamp resources with factory_uuid and timestamp triggers
        #[arg(long)]
        stamp: bool,
    },

    /// Check the structure of an existing Terraform JSON document
    Validate {
        /// Path to the .tf.json document
        #[arg(short, long, default_value = "terraform/main.tf.json")]
        file: PathBuf,
    },

    /// List resources and the BLAKE3 digest of a document
    Inspect {
        /// Path to the .tf.json document
        #[arg(short, long, default_value = "terraform/main.tf.json")]
        file: PathBuf,
    },
}

/// Overrides passed on the `generate` command line.
#[derive(Debug, Default)]
struct GenerateOverrides {
    env: Option<String>,
    count: Option<usize>,
    output: Option<PathBuf>,
    stamp: bool,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Generate {
            file,
            env,
            count,
            output,
            stamp,
        } => cmd_generate(
            &file,
            GenerateOverrides {
                env,
                count,
                output,
                stamp,
            },
        ),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Inspect { file } => cmd_inspect(&file),
    }
}

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = path.join("nullforge.yaml");
    if config_path.exists() {
        return Err(Error::Config(format!(
            "{} already exists",
            config_path.display()
        )));
    }
    output::write_atomic(&config_path, DEFAULT_CONFIG)?;

    println!("Initialized nullforge project at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

/// Load the generation config, falling back to the built-in default.
fn load_config(file: &Path) -> Result<GenerateConfig> {
    if file.exists() {
        parser::parse_config_file(file)
    } else {
        log::info!("{} not found, using built-in defaults", file.display());
        parser::parse_config(DEFAULT_CONFIG)
    }
}

fn cmd_generate(file: &Path, overrides: GenerateOverrides) -> Result<()> {
    let mut config = load_config(file)?;
    if let Some(env) = overrides.env {
        config.env_name = env;
    }
    if let Some(count) = overrides.count {
        config.fleet.count = count;
    }
    if let Some(out) = overrides.output {
        config.output = out;
    }
    config.stamp_triggers |= overrides.stamp;

    let errors = parser::validate_config(&config);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(Error::Validation(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let store = ConfigStore::get_or_create(&config.env_name);
    if store.env_name() != config.env_name {
        log::warn!(
            "config store already initialized for '{}', ignoring '{}'",
            store.env_name(),
            config.env_name
        );
    }
    store.extend(config.settings.clone());

    let factory = if config.stamp_triggers {
        NullResourceFactory::stamped()
    } else {
        NullResourceFactory::new()
    };
    let mut builder = InfrastructureBuilder::from_store(store)
        .with_base_name(&config.fleet.base_name)
        .with_factory(factory);
    builder.build_fleet(config.fleet.count)?;
    for custom in &config.custom_resources {
        builder.add_custom_resource(&custom.name, custom.triggers.clone())?;
    }
    let report = builder.export(&config.output)?;

    println!(
        "Terraform JSON written to {} ({} resources, env {})",
        report.path.display(),
        report.resources,
        builder.env_name()
    );
    println!("  {}", report.hash);
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<()> {
    match parser::validate_document_file(file) {
        Ok(count) => {
            println!("OK: {} ({} resources)", file.display(), count);
            Ok(())
        }
        Err(Error::Validation(messages)) => {
            for m in &messages {
                eprintln!("  ERROR: {}", m);
            }
            Err(Error::Validation(messages))
        }
        Err(e) => Err(e),
    }
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let doc = output::load_document(file)?;
    println!("{} ({} resources)", file.display(), doc.len());
    for fragment in &doc.resource {
        let Some((tag, blocks)) = fragment.as_object().and_then(|m| m.iter().next()) else {
            continue;
        };
        let Some(block) = blocks
            .as_array()
            .and_then(|list| list.first())
            .and_then(|b| b.as_object())
        else {
            continue;
        };
        for (name, attrs) in block {
            let triggers = &attrs[0][TRIGGERS_KEY];
            println!("  {}.{} {}", tag, name, triggers);
        }
    }
    println!("  {}", hasher::hash_file(file)?);
    Ok(())
}
