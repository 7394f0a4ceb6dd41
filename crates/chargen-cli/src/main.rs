//! chargen CLI - Character prompt generation and management
//!
//! Generate characters locally or through an LM Studio model, edit their
//! prompts, and copy prompts out for role-play sessions.

mod config;

use anyhow::{bail, Context, Result};
use chargen::{
    Character, CharacterStore, DomainError, GenerationClient, GenerationStrategy,
    JsonFileRepository,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Editor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "chargen")]
#[command(about = "Character prompt generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Character data file (overrides config and CHARGEN_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new characters
    Generate {
        /// How many characters to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
        /// Generate through the configured LM Studio server
        #[arg(short, long)]
        smart: bool,
        /// Model to use with --smart (defaults to config, then the first listed model)
        #[arg(short, long)]
        model: Option<String>,
        /// Local generation strategy: weighted, uniform
        #[arg(long)]
        strategy: Option<GenerationStrategy>,
        /// Seed for reproducible local generation
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List stored characters
    List,

    /// Show a character's prompt
    Show {
        /// Character id or unique id prefix
        id: String,
        /// Print the stored record as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Edit a character by rewriting its prompt
    Edit {
        /// Character id or unique id prefix
        id: String,
        /// Read the edited prompt from a file ("-" for stdin) instead of $EDITOR
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Remove characters
    Remove {
        /// Character ids or unique id prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print prompts separated by blank lines
    Prompts {
        /// Only include these characters (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,
    },

    /// List models offered by the LM Studio server
    Models,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(path) = cli.data_file {
        config.data_file = Some(path);
    }
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Generate {
            count,
            smart,
            model,
            strategy,
            seed,
        } => cmd_generate(config, count, smart, model, strategy, seed).await,
        Commands::List => cmd_list(&config),
        Commands::Show { id, json } => cmd_show(&config, &id, json),
        Commands::Edit { id, file } => cmd_edit(&config, &id, file),
        Commands::Remove { ids } => cmd_remove(&config, &ids),
        Commands::Prompts { ids } => cmd_prompts(&config, &ids),
        Commands::Models => cmd_models(&config).await,
        Commands::Config { action } => cmd_config(&config, action.unwrap_or(ConfigAction::Show)),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chargen=debug,chargen_cli=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> Result<CharacterStore<JsonFileRepository>> {
    let path = config.data_path()?;
    CharacterStore::open(JsonFileRepository::new(&path), config.generator())
        .with_context(|| format!("Failed to load characters from {:?}", path))
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_generate(
    mut config: Config,
    count: usize,
    smart: bool,
    model: Option<String>,
    strategy: Option<GenerationStrategy>,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    let mut store = open_store(&config)?;

    if smart {
        let client = config.client();
        let model = match model.or_else(|| config.default_model.clone()) {
            Some(model) => model,
            None => client.first_model().await.with_context(|| {
                format!("No models found. Is LM Studio running at {}?", client.base_url())
            })?,
        };
        let system_prompt = config.system_prompt()?;

        println!("Generating with {}...", model.cyan());
        for _ in 0..count {
            match store.add_generated(&client, &model, &system_prompt).await? {
                Some(character) => print_added(character),
                None => bail!("Generation failed: no data returned from {}", client.base_url()),
            }
        }
        return Ok(());
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for _ in 0..count {
        let character = store.generate(&mut rng)?;
        print_added(character);
    }

    Ok(())
}

fn print_added(character: &Character) {
    println!(
        "{} Added {} {}",
        "✓".green(),
        character.name.cyan().bold(),
        character.short_id().dimmed()
    );
}

fn cmd_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;

    if store.is_empty() {
        println!("No characters yet.");
        println!("\n{}", "Create one with:".dimmed());
        println!("  chargen generate");
        return Ok(());
    }

    println!("{}", "Characters:".bold());
    for character in store.characters() {
        println!(
            "  {} {} ({}, {}) {}",
            character.short_id().dimmed(),
            character.name.cyan().bold(),
            character.gender,
            character.age,
            character.traits.join(", ").dimmed()
        );
    }

    Ok(())
}

fn cmd_show(config: &Config, id: &str, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let character = store.resolve(id)?;

    if json {
        let record = serde_json::to_string_pretty(&character.to_record())
            .context("Failed to serialize character")?;
        println!("{}", record);
    } else {
        println!("{}", character.format_prompt());
    }

    Ok(())
}

fn cmd_edit(config: &Config, id: &str, file: Option<String>) -> Result<()> {
    let mut store = open_store(config)?;
    let character = store.resolve(id)?;
    let id = character.id().to_string();
    let current = character.format_prompt();

    let edited = match file.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read prompt from stdin")?;
            text
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path))?,
        None => match Editor::new()
            .extension(".txt")
            .edit(&current)
            .context("Failed to open editor")?
        {
            Some(text) => text,
            None => {
                println!("Edit aborted, nothing saved.");
                return Ok(());
            }
        },
    };

    let update = store.apply_prompt_edit(&id, &edited)?;
    if update.is_empty() {
        println!("No recognized fields in the edited prompt, nothing saved.");
        return Ok(());
    }

    let name = store.get(&id).map(|c| c.name.as_str()).unwrap_or("-");
    println!(
        "{} Updated {} [{}]",
        "✓".green(),
        name.cyan(),
        update.changed_fields().join(", ")
    );

    Ok(())
}

fn cmd_remove(config: &Config, ids: &[String]) -> Result<()> {
    let mut store = open_store(config)?;

    // Resolve everything first so a bad prefix removes nothing.
    let targets = ids
        .iter()
        .map(|id| {
            store
                .resolve(id)
                .map(|c| (c.id().to_string(), c.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (id, name) in targets {
        if store.remove(&id)? > 0 {
            println!("{} Removed {} {}", "✓".green(), name.cyan(), id.dimmed());
        }
    }

    Ok(())
}

fn cmd_prompts(config: &Config, ids: &[String]) -> Result<()> {
    let store = open_store(config)?;

    let selected = ids
        .iter()
        .map(|id| store.resolve(id).map(|c| c.id().to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    let prompts = store.all_prompts(Some(selected.as_slice()));
    if !prompts.is_empty() {
        println!("{}", prompts);
    }

    Ok(())
}

async fn cmd_models(config: &Config) -> Result<()> {
    let client = config.client();
    let models = client
        .try_list_models()
        .await
        .map_err(DomainError::from)
        .with_context(|| format!("Is LM Studio running at {}?", client.base_url()))?;

    if models.is_empty() {
        bail!("LM Studio at {} reports no loaded models", client.base_url());
    }

    println!("{}", "Models:".bold());
    for model in models {
        let is_default = config.default_model.as_deref() == Some(model.as_str());
        let marker = if is_default { " (default)".green().to_string() } else { String::new() };
        println!("  {}{}", model.cyan(), marker);
    }

    Ok(())
}

fn cmd_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Data file: {:?}", config.data_path()?);
            println!("  Base URL: {}", config.base_url);
            println!(
                "  Default model: {}",
                config.default_model.as_deref().unwrap_or("None").cyan()
            );
            println!(
                "  System prompt: {}",
                config
                    .system_prompt_file
                    .as_ref()
                    .map(|p| format!("{:?}", p))
                    .unwrap_or_else(|| "built-in".to_string())
            );
            println!("  Strategy: {}", config.strategy);
            println!("  Temperature: {}", config.temperature);
            println!(
                "  Timeouts: {}s list, {}s generate",
                config.list_timeout_secs, config.generate_timeout_secs
            );
        }

        ConfigAction::Init { force } => {
            let path = Config::config_path()?;
            if path.exists() && !force {
                bail!("Config already exists at {:?} (use --force to overwrite)", path);
            }
            Config::default().save()?;
            println!("{} Config written to {:?}", "✓".green(), path);
        }
    }

    Ok(())
}
