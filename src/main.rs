use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_service::cli::ServeArgs;
use transcript_service::{server, Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.resolved_command().unwrap_or_else(|e| e.exit());

    // Writing a fresh config file must not require it to exist already
    let source = match (&command, cli.config.as_deref()) {
        (Commands::Config { show: false }, Some(path)) if !path.exists() => None,
        (_, explicit) => Config::locate(explicit)?,
    };
    let mut config = match &source {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    init_tracing(cli.verbose, cli.log_json || config.logging.json);

    match &source {
        Some(path) => tracing::debug!("Loaded configuration from {}", path.display()),
        None => tracing::debug!("No config file found, using defaults"),
    }

    match command {
        Commands::Serve(ServeArgs { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            tracing::info!(
                "Starting transcript service (languages: {}, cache TTL: {}h)",
                config.transcript.languages.join(", "),
                config.cache.ttl_hours
            );
            server::serve(config).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "transcript_service=debug,transcricao=debug"
    } else {
        "transcript_service=info,transcricao=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
