use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcricao",
    about = "Transcript Service - numbered YouTube transcripts over HTTP",
    version,
    long_about = "A small HTTP API that returns the transcript of a YouTube video as numbered lines. Tries the YouTube transcript API first, falls back to the timed-text XML endpoint, and caches results in memory for 24 hours."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve(ServeArgs),

    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

/// `serve` arguments on their own, used when no subcommand is given
#[derive(Parser)]
#[command(name = "transcricao")]
struct DefaultServe {
    #[command(flatten)]
    serve: ServeArgs,
}

impl Cli {
    /// The requested command, falling back to `serve` with its env defaults
    pub fn resolved_command(&self) -> Result<Commands, clap::Error> {
        match &self.command {
            Some(Commands::Serve(args)) => Ok(Commands::Serve(args.clone())),
            Some(Commands::Config { show }) => Ok(Commands::Config { show: *show }),
            None => DefaultServe::try_parse_from(["transcricao"])
                .map(|defaults| Commands::Serve(defaults.serve)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["transcricao", "serve", "--port", "3000"]).unwrap();
        match cli.resolved_command().unwrap() {
            Commands::Serve(args) => assert_eq!(args.port, Some(3000)),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_config_show_with_global_flags() {
        let cli = Cli::try_parse_from(["transcricao", "config", "--show", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.resolved_command().unwrap(), Commands::Config { show: true }));
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["transcricao", "serve", "--port", "99999"]).is_err());
    }
}
