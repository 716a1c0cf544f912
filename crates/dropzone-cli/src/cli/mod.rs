//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dropzone_core::AcceptRule;
use dropzone_core::config::{Config, UploadConfig};
use tracing_subscriber::EnvFilter;

mod commands;

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "DROPZONE_LOG";

#[derive(Parser)]
#[command(name = "dropzone")]
#[command(version)]
#[command(about = "Stage, validate and preview files for upload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Upload constraints that override the config file's `[upload]` table.
#[derive(clap::Args, Debug, Clone, Default)]
struct UploadArgs {
    /// Accepted types, comma-separated (e.g. "image/*,.pdf")
    #[arg(long, value_name = "RULES")]
    accept: Option<String>,

    /// Maximum file size in bytes
    #[arg(long, value_name = "BYTES")]
    max_size: Option<u64>,

    /// Hold more than one file at a time (`--multiple=false` turns it off)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    multiple: Option<bool>,
}

impl UploadArgs {
    fn apply(&self, mut upload: UploadConfig) -> Result<UploadConfig> {
        if let Some(accept) = self.accept.as_deref() {
            upload.accept = AcceptRule::parse_list(accept)
                .with_context(|| format!("invalid --accept '{accept}'"))?;
        }
        if self.max_size.is_some() {
            upload.max_size = self.max_size;
        }
        if let Some(multiple) = self.multiple {
            upload.multiple = multiple;
        }
        Ok(upload)
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Submit files as one selection and print the staged session
    Stage {
        #[command(flatten)]
        upload: UploadArgs,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,

        /// Files to select (drag-and-drop escaped paths are accepted)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Validate files without staging them; fails if any is rejected
    Check {
        #[command(flatten)]
        upload: UploadArgs,

        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Replay a JSON script of drag, selection and removal events
    Replay {
        /// Script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        #[command(flatten)]
        upload: UploadArgs,

        /// Print the final session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the effective configuration
    Show,
    /// Generate a fresh config from Rust defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("load config")?;
    init_logging(&config);
    dispatch(cli, &config)
}

fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Stage {
            upload,
            json,
            paths,
        } => {
            let upload = upload.apply(config.upload.clone())?;
            commands::stage::stage(upload, &paths, json)
        }
        Commands::Check { upload, paths } => {
            let upload = upload.apply(config.upload.clone())?;
            commands::stage::check(&upload, &paths)
        }
        Commands::Replay {
            script,
            upload,
            json,
        } => {
            let script = commands::replay::load(&script)?;
            let base = script.config.clone().unwrap_or_else(|| config.upload.clone());
            let upload = upload.apply(base)?;
            commands::replay::run(script, upload, json)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(config),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

/// Installs the stderr tracing subscriber.
///
/// Filter precedence: `DROPZONE_LOG`, then `log.filter` from config, then `warn`.
fn init_logging(config: &Config) {
    let fallback = config.log.filter.as_deref().unwrap_or("warn");
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
