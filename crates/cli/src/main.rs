mod render;
mod repl;
mod slash;
mod voice;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use socratic_agent::{LessonExplainer, SessionController};
use socratic_core::logging::{self, LoggingConfig, PrivacyConfig};
use socratic_core::{Config, find_lesson};
use socratic_providers::{ModelGateway, ProviderFactory};
use std::path::PathBuf;

/// Socratic - a tutoring chat for sorting algorithms
#[derive(Parser, Debug)]
#[command(name = "socratic")]
#[command(about = "A Socratic teaching assistant for data structures and algorithms", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to socratic.toml (default: ./socratic.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive chat
    Chat,
    /// Explain one lesson's visualization and exit
    Learn {
        /// Lesson name or number, e.g. "Merge Sort" or 2
        #[arg(required = true, value_name = "TOPIC")]
        topic: Vec<String>,
    },
    /// List the available lessons
    Lessons,
    /// Print an example configuration file
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lessons => {
            render::print_lessons();
            return Ok(());
        }
        Commands::Config => {
            print!("{}", Config::example());
            return Ok(());
        }
        _ => {}
    }

    socratic_core::config::load_dotenv();
    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let _guard = init_logging(&config, cli.verbose)?;

    if cli.verbose {
        render::print_info(&format!(
            "Provider: {} ({})",
            config.provider.kind().as_str(),
            config.provider.model_name()
        ));
    }

    match cli.command {
        Commands::Chat => cmd_chat(config).await,
        Commands::Learn { topic } => cmd_learn(config, &topic.join(" ")).await,
        Commands::Lessons | Commands::Config => Ok(()),
    }
}

fn init_logging(config: &Config, verbose: bool) -> Result<Option<logging::WorkerGuard>> {
    let mut logging_config = LoggingConfig::try_from(config.logging.clone())?;
    if verbose {
        logging_config = logging_config.with_level("debug");
    }
    Ok(logging::init_logging(Some(logging_config))?)
}

fn build_gateway(config: &Config) -> Result<ModelGateway> {
    let provider = ProviderFactory::create_from_config(&config.provider).context("Failed to create provider")?;
    Ok(ModelGateway::new(provider, config.generation.clone()))
}

fn build_controller(config: &Config) -> Result<SessionController> {
    let privacy = PrivacyConfig {
        log_message_text: config.logging.privacy.log_message_text,
        truncate_length: config.logging.privacy.truncate_length,
    };

    Ok(SessionController::new(build_gateway(config)?, config.chat.opening_message.clone())
        .with_assets_dir(config.assets.dir.clone())
        .with_privacy(privacy))
}

/// Run the interactive chat
async fn cmd_chat(config: Config) -> Result<()> {
    let controller = build_controller(&config)?;
    tracing::info!(provider = controller.gateway().provider_name(), "Session ready");

    let mut repl = repl::Repl::new(controller, config.voice.clone());
    repl.run().await
}

/// Explain one lesson and exit
async fn cmd_learn(config: Config, query: &str) -> Result<()> {
    let lesson = find_lesson(query).with_context(|| format!("Unknown lesson '{}'; run `socratic lessons`", query))?;
    let gateway = build_gateway(&config)?;
    let explainer = LessonExplainer::new(&gateway, &config.assets.dir);

    println!("{}", "Obtaining...".dimmed());
    let explanation = explainer.explain(lesson).await?;
    render::print_explanation(&explanation);
    Ok(())
}
