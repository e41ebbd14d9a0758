use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use conta_digital::cli::{self, App, Cli};
use conta_digital::config::ClientConfig;
use conta_digital::error::FormError;
use conta_digital::interactive;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (config, notes) = ClientConfig::load_or_default(&cli.config);

    // RUST_LOG wins over the config file
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    for note in &notes {
        note.log();
    }

    let app = match App::new(config, cli.api_url) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to open session store: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Using API at {}", app.config.api.base_url);

    match cli.command {
        Some(command) => match cli::dispatch(&app, command).await {
            Ok(()) => {}
            Err(FormError::Redirect) => {
                eprintln!("Not logged in. Run `conta_digital login --email <EMAIL>` first.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            if let Err(e) = interactive::run(&app, &mut interactive::Terminal).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
