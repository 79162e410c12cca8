mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recast_config_hcl::HclParser;
use recast_engine::config::{ConfigParser, RecastConfig};

#[derive(Parser)]
#[command(name = "recast", about = "Schema-driven record conversion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert input records and print one JSON object per line.
    Convert {
        /// Path to configuration file (.toml or .hcl).
        #[arg(long, default_value = "recast.toml", env = "RECAST_CONFIG")]
        config: String,

        /// Input file. Reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Treat the Avro input as one raw datum instead of a container file.
        #[arg(long)]
        raw: bool,
    },

    /// Validate configuration and schema, then exit.
    Check {
        /// Path to configuration file (.toml or .hcl).
        #[arg(long, default_value = "recast.toml", env = "RECAST_CONFIG")]
        config: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let config_path = match &cli.command {
        Command::Convert { config, .. } | Command::Check { config } => config.clone(),
    };

    let parsers: [&dyn ConfigParser; 1] = [&HclParser];
    let loaded = RecastConfig::load_with(&config_path, &parsers);

    let default_level = loaded
        .as_ref()
        .ok()
        .and_then(|c| c.converter.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    tracing::info!(config = %config_path, "loading configuration");
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Convert { input, raw, .. } => {
            run::convert(&config.converter, input.as_deref(), raw).map(|summary| {
                tracing::info!(
                    converted = summary.converted,
                    failed = summary.failed,
                    "conversion finished"
                );
            })
        }
        Command::Check { .. } => run::check(&config.converter).map(|report| println!("{report}")),
    };

    if let Err(e) = result {
        for schema_error in e.schema_errors() {
            eprintln!("  - {schema_error}");
        }
        tracing::error!(error = %e, "recast failed");
        std::process::exit(1);
    }
}
