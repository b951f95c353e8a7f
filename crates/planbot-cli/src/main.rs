use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

mod commands;

#[derive(Parser)]
#[command(name = "planbot-cli", version, about = "Planbot CLI")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session with the assistant
    Chat,
    /// One-shot extraction of event or task details from a message
    Extract {
        #[command(flatten)]
        args: commands::extract::ExtractArgs,
    },
    /// Service authorization (links and code exchange)
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let result = match cli.command {
        Commands::Chat => commands::chat::run().await,
        Commands::Extract { args } => commands::extract::run(args).await,
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
