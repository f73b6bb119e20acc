//! EntitySchema CLI
//!
//! Inspect, diff and upgrade stored EntitySchema documents.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use entity_schema::config::OutputFormat;
use entity_schema::differ::schema_text_unified_diff;
use entity_schema::{EntitySchemaConfig, EntitySchemaDiffer, EntitySchemaEncoder, EntitySchemaId, SchemaConverter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "entityschema")]
#[command(about = "Inspect, diff and upgrade EntitySchema documents")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print compact JSON regardless of the configured format
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    /// Name badges per language
    Full,
    /// Per-field maps
    Array,
    /// Only the stored ID
    Id,
    /// One language's terms plus the schema text
    Mono,
    /// Wikibase entity array
    Wikibase,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a stored document and print a normalized view of it
    Convert {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "full")]
        view: View,

        /// Language for the mono view; extra empty badge for the full view
        #[arg(long)]
        lang: Option<String>,
    },

    /// Diff two stored documents
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Print a unified diff of the schema texts instead of operations
        #[arg(long)]
        text: bool,
    },

    /// Re-encode a stored document in the latest layout
    Upgrade {
        file: PathBuf,

        /// Write the result back to the file
        #[arg(long)]
        in_place: bool,
    },

    /// Check whether a string is a valid EntitySchema ID
    CheckId { id: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = EntitySchemaConfig::load_from(cli.config.as_deref())?;
    let format = if cli.compact {
        OutputFormat::Compact
    } else {
        config.output.format
    };
    let converter = SchemaConverter::new();

    match cli.command {
        Commands::Convert { file, view, lang } => {
            let raw = read(&file)?;
            let rendered = match view {
                View::Full => {
                    let preferred: Vec<&str> = lang.as_deref().into_iter().collect();
                    format.render(&converter.get_full_view_schema_data(&raw, &preferred)?)?
                }
                View::Array => format.render(&converter.get_full_array_schema_data(&raw)?)?,
                View::Id => format.render(&converter.get_schema_id(&raw)?)?,
                View::Mono => {
                    let Some(lang) = lang else {
                        bail!("--lang is required for the mono view");
                    };
                    format.render(&converter.get_monolingual_schema_data(&raw, &lang)?)?
                }
                View::Wikibase => format.render(&converter.get_full_wikibase_array_schema_data(&raw)?)?,
            };
            println!("{}", rendered);
        }

        Commands::Diff { old, new, text } => {
            let (old, new) = (read(&old)?, read(&new)?);
            if text {
                print!(
                    "{}",
                    schema_text_unified_diff(&converter.get_schema_text(&old)?, &converter.get_schema_text(&new)?)
                );
            } else {
                let diff = EntitySchemaDiffer::new().diff_contents(&old, &new)?;
                if diff.is_empty() {
                    eprintln!("No changes");
                }
                println!("{}", format.render(&diff.operations())?);
            }
        }

        Commands::Upgrade { file, in_place } => {
            let upgraded = EntitySchemaEncoder::upgrade(&read(&file)?)?;
            if in_place {
                std::fs::write(&file, &upgraded)
                    .with_context(|| format!("failed to write {}", file.display()))?;
                eprintln!("✅ Upgraded {}", file.display());
            } else {
                println!("{}", upgraded);
            }
        }

        Commands::CheckId { id } => match EntitySchemaId::new(id.as_str()) {
            Ok(id) => println!("✅ {} (numeric part {})", id, id.numeric_id()),
            Err(e) => {
                println!("❌ {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
