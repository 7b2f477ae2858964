use clap::Parser;
use ftp_watcher::Settings;
use ftp_watcher::cli::commands;
use ftp_watcher::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let config = config.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    ftp_watcher::logging::init_with_config(&config.logging);

    match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&config),
        Commands::Run(args) => {
            if let Err(e) = commands::run::run(args, config).await {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}
