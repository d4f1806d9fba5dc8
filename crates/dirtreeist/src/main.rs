use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dirtree_core::block::render_source;
use dirtree_core::sanitize::sanitize_dirtree_html;
use dirtree_core::{CommandGenerator, PreformattedGenerator, TreeGenerator};
use dirtreeist::{CodeBlockRegistry, DirtreeistPlugin, PluginManager, SettingsStore};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "dirtreeist")]
#[command(version, about = "Render dirtree code blocks as styled directory trees")]
struct Cli {
    /// External tree generator; block bodies are treated as ready-made tree text without it
    #[arg(long, global = true)]
    generator_cmd: Option<String>,

    /// Argument passed to the generator (repeatable)
    #[arg(long = "generator-arg", global = true, allow_hyphen_values = true)]
    generator_args: Vec<String>,

    /// Settings file (defaults to DIRTREEIST_CONFIG_PATH or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate and render a single dirtree block body
    Tree {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
        /// Wrap the lines in the code block elements
        #[arg(long)]
        wrap: bool,
    },
    /// Render a markdown document, processing its dirtree blocks
    Render {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
        /// Clean the output HTML, keeping only dirtree classes
        #[arg(long)]
        sanitize: bool,
    },
    /// Inspect or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored settings as JSON
    Show,
    /// Print the settings panel
    Panel,
    /// Change one setting
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("dirtreeist", LevelFilter::Debug);
        logger.filter_module("dirtree_core", LevelFilter::Debug);
    }
    logger.init();

    let cli = Cli::parse();

    let store = match cli.config {
        Some(path) => SettingsStore::new(Some(path)),
        None => SettingsStore::from_env(),
    };
    let generator: Arc<dyn TreeGenerator> = match cli.generator_cmd {
        Some(program) => Arc::new(CommandGenerator::new(program, cli.generator_args)),
        None => Arc::new(PreformattedGenerator),
    };

    let result = run(cli.command, store, generator).await;
    if let Err(err) = &result {
        log::error!("dirtreeist failed: {:#}", err);
    }
    result
}

async fn run(command: Command, store: SettingsStore, generator: Arc<dyn TreeGenerator>) -> Result<()> {
    let plugin = DirtreeistPlugin::load(store, Arc::clone(&generator)).await?;

    match command {
        Command::Tree { file, wrap } => {
            let input = read_input(file).await?;
            let source = input.strip_suffix('\n').unwrap_or(&input);
            let settings = plugin.settings()?;
            let code = if wrap {
                dirtree_core::process_dirtree_block(generator.as_ref(), &settings, source)?
            } else {
                render_source(generator.as_ref(), &settings, source)?
            };
            println!("{}", code);
        }
        Command::Render { file, sanitize } => {
            let markdown = read_input(file).await?;

            let mut registry = CodeBlockRegistry::new();
            let mut plugins = PluginManager::new();
            plugins.load_plugin(Box::new(plugin), &mut registry)?;

            let html = registry.render_document(&markdown)?;
            plugins.unload_all(&mut registry)?;

            if sanitize {
                print!("{}", sanitize_dirtree_html(&html));
            } else {
                print!("{}", html);
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&plugin.settings()?)?);
            }
            SettingsAction::Panel => {
                print!("{}", plugin.settings_panel()?);
            }
            SettingsAction::Set { key, value } => {
                plugin.update_setting(&key, &value).await?;
                print!("{}", plugin.settings_panel()?);
            }
        },
    }

    Ok(())
}

async fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}
