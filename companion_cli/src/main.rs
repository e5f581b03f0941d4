use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use companion_cli::logging::init_global_logger;
use companion_cli::ui::tui_app::run_blocking;
use companion_cli::TuiApp;
use companion_core::api::{build_generator, OfflineGenerator, RemarkGenerator};
use companion_core::utils::config::mask_secret;
use companion_core::utils::error::ResultExt;
use companion_core::{AnimalKind, Config};

#[derive(Parser)]
#[command(name = "companion")]
#[command(about = "An animal that follows your mouse around the terminal", long_about = None)]
struct Cli {
    /// Companion to start with (cat, dog, fox, rabbit, panda, dragon)
    #[arg(short, long)]
    persona: Option<AnimalKind>,

    /// Start with remarks turned off
    #[arg(long)]
    no_remarks: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file to use instead of ~/.companion/config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn run_config_command(command: &ConfigCommand, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to_file(path)?;
            println!("✅ Wrote default configuration to {}", path.display());
        }
        ConfigCommand::Show => {
            let mut config = Config::load_or_default(path)?;
            if let Some(key) = config.generator.resolved_api_key() {
                config.generator.api_key = mask_secret(&key);
            }
            let yaml = serde_yaml::to_string(&config).with_config_context("show")?;
            println!("# {}", path.display());
            print!("{}", yaml);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::get_config_path);

    if let Some(Command::Config(command)) = &cli.command {
        return run_config_command(command, &config_path);
    }

    if let Err(e) = init_global_logger(cli.debug) {
        eprintln!("⚠️ Failed to initialize logger: {}", e);
    }

    let mut config = Config::load_or_default(&config_path)?;
    if let Some(persona) = cli.persona {
        config.persona = persona;
    }
    if cli.no_remarks {
        config.remarks_enabled = false;
    }

    let generator: Arc<dyn RemarkGenerator> = match build_generator(&config.generator) {
        Ok(generator) => generator,
        Err(err) => {
            tracing::warn!(error = %err, "remote generator unavailable, remarks will use canned phrases");
            Arc::new(OfflineGenerator::new(config.generator.provider))
        }
    };
    tracing::info!(
        persona = %config.persona,
        provider = %config.generator.provider,
        remarks = config.remarks_enabled,
        "starting companion"
    );

    let mut tui = TuiApp::new(&config, generator)?;
    let result = run_blocking(|| tui.run());
    tui.shutdown().await;
    result
}
