use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use bot_console::cli::{autoresponses, commands, converters, groups, stats, words, TerminalSink};
use bot_console::{Config, Console, ConsoleError, HttpApi};

#[derive(Parser)]
#[command(name = "bot-console")]
#[command(about = "Admin console for the chat bot: groups, commands, auto responses, converters and usage stats")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "bot-console.yaml")]
    config: String,

    /// Backend URL (overrides config and BOT_CONSOLE_URL)
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Registered groups
    Groups {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Bot commands
    Commands {
        #[command(subcommand)]
        command: CommandCommands,
    },

    /// Keyword auto responses
    #[command(name = "autoresponses", alias = "ar")]
    AutoResponses {
        #[command(subcommand)]
        command: AutoResponseCommands,
    },

    /// XRay link converters
    Converters {
        #[command(subcommand)]
        command: ConverterCommands,
    },

    /// Show usage statistics
    Stats {
        /// Trailing window in days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Forbidden words per group
    Words {
        #[command(subcommand)]
        command: WordCommands,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// List registered groups
    List,
    /// Register a group
    Add {
        /// Group JID, e.g. 120363xxxx@g.us
        jid: String,
        /// Display name
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Register the group disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Let the bot respond in a group
    Enable { jid: String },
    /// Stop the bot responding in a group
    Disable { jid: String },
    /// Unregister a group
    Delete { jid: String },
    /// List groups the bot has joined
    Discover,
}

#[derive(Subcommand)]
enum CommandCommands {
    /// List commands
    List,
    /// Show one command
    Show { command: String },
    /// Create a command
    Add(commands::AddArgs),
    /// Edit a command
    Edit(commands::EditArgs),
    /// Delete a command
    Delete { command: String },
}

#[derive(Subcommand)]
enum AutoResponseCommands {
    /// List auto responses
    List,
    /// Create an auto response
    Add(autoresponses::AddArgs),
    /// Edit an auto response
    Edit(autoresponses::EditArgs),
    /// Delete an auto response
    Delete { keyword: String },
}

#[derive(Subcommand)]
enum ConverterCommands {
    /// List converters
    List,
    /// Create a converter
    Add(converters::AddArgs),
    /// Edit a converter
    Edit(converters::EditArgs),
    /// Delete a converter
    Delete { command: String },
}

#[derive(Subcommand)]
enum WordCommands {
    /// List forbidden words of a group
    List { jid: String },
    /// Forbid a word in a group
    Add { jid: String, word: String },
    /// Remove a forbidden word by ID
    Delete { jid: String, id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bot_console=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // already shown as a notification
        Err(e) if e.downcast_ref::<ConsoleError>().is_some() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load(&cli.config)?;
    config.apply_env();
    if let Some(url) = cli.url {
        config.server.base_url = url;
    }

    let api = HttpApi::new(&config.server)?;
    tracing::debug!("Using backend at {}", api.base_url());
    let mut console = Console::new(api, &config).with_sink(Box::new(TerminalSink));

    match cli.command {
        Commands::Groups { command } => match command {
            GroupCommands::List => groups::list(&mut console).await?,
            GroupCommands::Add {
                jid,
                name,
                description,
                inactive,
            } => groups::add(&mut console, jid, name, description, inactive).await?,
            GroupCommands::Enable { jid } => groups::set_active(&mut console, &jid, true).await?,
            GroupCommands::Disable { jid } => {
                groups::set_active(&mut console, &jid, false).await?
            }
            GroupCommands::Delete { jid } => groups::delete(&mut console, &jid).await?,
            GroupCommands::Discover => groups::discover(&mut console).await?,
        },
        Commands::Commands { command } => match command {
            CommandCommands::List => commands::list(&mut console).await?,
            CommandCommands::Show { command } => commands::show(&mut console, &command).await?,
            CommandCommands::Add(args) => commands::add(&mut console, args).await?,
            CommandCommands::Edit(args) => commands::edit(&mut console, args).await?,
            CommandCommands::Delete { command } => {
                commands::delete(&mut console, &command).await?
            }
        },
        Commands::AutoResponses { command } => match command {
            AutoResponseCommands::List => autoresponses::list(&mut console).await?,
            AutoResponseCommands::Add(args) => autoresponses::add(&mut console, args).await?,
            AutoResponseCommands::Edit(args) => autoresponses::edit(&mut console, args).await?,
            AutoResponseCommands::Delete { keyword } => {
                autoresponses::delete(&mut console, &keyword).await?
            }
        },
        Commands::Converters { command } => match command {
            ConverterCommands::List => converters::list(&mut console).await?,
            ConverterCommands::Add(args) => converters::add(&mut console, args).await?,
            ConverterCommands::Edit(args) => converters::edit(&mut console, args).await?,
            ConverterCommands::Delete { command } => {
                converters::delete(&mut console, &command).await?
            }
        },
        Commands::Stats { days } => {
            stats::run(&mut console, days, config.stats.top, config.stats.recent).await?
        }
        Commands::Words { command } => match command {
            WordCommands::List { jid } => words::list(&mut console, &jid).await?,
            WordCommands::Add { jid, word } => words::add(&mut console, jid, word).await?,
            WordCommands::Delete { jid, id } => words::delete(&mut console, &jid, id).await?,
        },
    }

    Ok(())
}
