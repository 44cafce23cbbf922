//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Watch, transpile and live-preview documentation
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root directory (default: current directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Config file path, relative to the root (default: docwatch.toml)
    #[arg(short = 'C', long, global = true, default_value = "docwatch.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands (runs `default` when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Delete everything under the output directory
    Clean,

    /// Transpile every source document into the output directory
    #[command(visible_alias = "t")]
    Transpile,

    /// Watch the source directory and rebuild on change
    #[command(visible_alias = "w")]
    Watch,

    /// Inject links to generated documents into the index page
    #[command(visible_alias = "i")]
    Inject,

    /// Serve the project with live reload
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// clean, transpile, then watch and inject, then serve
    Default(ServeArgs),
}

/// Shared arguments for `serve` and `default`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Port for the live reload WebSocket
    #[arg(long)]
    pub reload_port: Option<u16>,
}

impl Cli {
    /// The command to run, `default` when none was given.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Default(ServeArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_default() {
        let cli = Cli::parse_from(["docwatch"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.command(), Commands::Default(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["docwatch", "inject", "--root", "/tmp/x", "-v"]);
        assert!(matches!(cli.command(), Commands::Inject));
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert!(cli.verbose);

        let cli = Cli::parse_from(["docwatch", "--verbose", "transpile"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command(), Commands::Transpile));
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::parse_from(["docwatch", "serve", "-i", "0.0.0.0", "-p", "8080"]);
        let Commands::Serve(args) = cli.command() else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.interface, Some("0.0.0.0".parse().unwrap()));
        assert_eq!(args.reload_port, None);
    }
}
