//! EntitySchema Config CLI
//!
//! View and manage EntitySchema configuration.

use clap::{Parser, Subcommand};
use entity_schema::EntitySchemaConfig;

#[derive(Parser)]
#[command(name = "entityschema-config")]
#[command(about = "View and manage EntitySchema configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: entityschema.toml)
        #[arg(short, long, default_value = "entityschema.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = EntitySchemaConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 EntitySchema Configuration\n");
                println!("Repo:");
                println!("  Enabled: {}", cfg.repo.enabled);
                println!("  Namespace: {}", cfg.repo.namespace);
                println!("  Concept base URI: {:?}", cfg.repo.concept_base_uri);

                println!("\nLimits:");
                println!("  Schema text: {} bytes", cfg.limits.schema_text_max_size_bytes);
                println!("  Name badge terms: {} chars", cfg.limits.name_badge_max_size_chars);

                println!("\nOutput:");
                println!("  Format: {:?}", cfg.output.format);
            }
        }

        Commands::Init { output } => {
            if std::path::Path::new(&output).exists() {
                return Err(format!("{} already exists", output).into());
            }
            EntitySchemaConfig::default().save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => match EntitySchemaConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                if cfg.limits.schema_text_max_size_bytes == 0 || cfg.limits.name_badge_max_size_chars == 0 {
                    eprintln!("❌ Configuration error: limits must be greater than zero");
                    std::process::exit(1);
                }
                println!("✅ Configuration is valid");
                println!("   Namespace: {}", cfg.repo.namespace);
                println!("   Schema text limit: {} bytes", cfg.limits.schema_text_max_size_bytes);
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
