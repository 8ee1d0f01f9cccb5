//! Drive the PWA manager against a simulated browser platform.
//!
//! ## Usage
//!
//! ```bash
//! # Scripted session, transcript as JSON on stdout
//! pwa-sim run --choice accept --offline-cycles 2 --stage-update
//!
//! # Same, with a config file and JSON logs
//! pwa-sim --config pwakit.json --log-format json run
//!
//! # Print the effective configuration
//! pwa-sim config
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pwakit_common::{init_logging, LogConfig, LogFormat, PwaConfig};
use pwakit_sw::UserChoice;
use std::path::PathBuf;

mod scenario;

#[derive(Parser)]
#[command(name = "pwa-sim")]
#[command(about = "Drive the PWA manager against a simulated browser platform")]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// Log filter, e.g. "pwakit_sw=debug"
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    Accept,
    Dismiss,
}

impl From<Choice> for UserChoice {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Accept => UserChoice::Accepted,
            Choice::Dismiss => UserChoice::Dismissed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and print its transcript
    Run {
        /// How the simulated user answers the install prompt
        #[arg(long, value_enum, default_value = "accept")]
        choice: Choice,
        /// Offline/online round trips to simulate
        #[arg(long, default_value = "1")]
        offline_cycles: u32,
        /// Stage a new worker script before checking for updates
        #[arg(long)]
        stage_update: bool,
        /// Background sync tag to register
        #[arg(long, default_value = "energy-readings")]
        sync_tag: String,
    },

    /// Print the effective configuration
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PwaConfig> {
    let config = match path {
        Some(path) => PwaConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PwaConfig::default(),
    };
    let config = config.with_env_overrides();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default().with_format(cli.log_format);
    if let Some(filter) = cli.log_filter {
        log_config = log_config.with_filter(filter);
    }
    init_logging(log_config);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run {
            choice,
            offline_cycles,
            stage_update,
            sync_tag,
        } => {
            let options = scenario::ScenarioOptions {
                choice: choice.into(),
                offline_cycles,
                stage_update,
                sync_tag,
            };
            let transcript = scenario::run(config, &options).await?;
            println!("{}", serde_json::to_string_pretty(&transcript)?);
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
