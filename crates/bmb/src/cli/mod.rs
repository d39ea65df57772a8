mod create;
mod crud;
mod info;
mod maintain;
mod new;
mod routes;
mod run;

pub use create::CreateCommand;
pub use crud::GenerateCrudCommand;
pub use maintain::{BumpVersionCommand, StripAccentsCommand};
pub use new::{InitCommand, NewCommand};
pub use run::RunCommand;

use std::ffi::OsString;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

/// BMB - Flask + BMDB project scaffolding
#[derive(Parser)]
#[command(name = "bmb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a project from the core template.
    Init(InitCommand),

    /// Create a project with web assets.
    New(NewCommand),

    /// Generate CRUD routes for a model.
    GenerateCrud(GenerateCrudCommand),

    /// Declare a model in models.bmdb and run the BMDB generator.
    Create(CreateCommand),

    /// List route modules of the current project.
    ListRoutes,

    /// Show BMB information and project status.
    Info,

    /// Print the BMB version.
    Version,

    /// Run the development API server.
    Run(RunCommand),

    /// Replace accented vowels in the files of a directory.
    StripAccents(StripAccentsCommand),

    /// Replace a version string in the files of a directory.
    BumpVersion(BumpVersionCommand),
}

impl Cli {
    /// Parse process arguments. Returns `None` when usage was printed instead.
    pub fn parse_args() -> Option<Self> {
        match Self::parse_from_args(std::env::args_os()) {
            Ok(Some(cli)) => Some(cli),
            Ok(None) => {
                print_usage();
                None
            }
            Err(e) => e.exit(),
        }
    }

    /// Parse arguments, mapping an unknown subcommand to `Ok(None)`.
    pub fn parse_from_args<I, T>(args: I) -> Result<Option<Self>, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) if cli.command.is_none() => Ok(None),
            Ok(cli) => Ok(Some(cli)),
            Err(e) if e.kind() == ErrorKind::InvalidSubcommand => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let Some(command) = self.command else {
            print_usage();
            return Ok(());
        };

        if !matches!(command, Commands::Run(_)) {
            init_tracing(if self.verbose { "debug" } else { "warn" });
        }

        match command {
            Commands::Init(cmd) => cmd.execute(),
            Commands::New(cmd) => cmd.execute(),
            Commands::GenerateCrud(cmd) => cmd.execute(),
            Commands::Create(cmd) => cmd.execute(),
            Commands::ListRoutes => routes::list_routes(),
            Commands::Info => info::show_info(),
            Commands::Version => info::show_version(),
            Commands::Run(cmd) => cmd.execute(self.verbose).await,
            Commands::StripAccents(cmd) => cmd.execute(),
            Commands::BumpVersion(cmd) => cmd.execute(),
        }
    }
}

fn print_usage() {
    let mut command = Cli::command();
    if command.print_help().is_ok() {
        println!();
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub(crate) fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
        )
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["bmb", "init", "myapp"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_new() {
        let cli = Cli::try_parse_from(["bmb", "new", "shop", "--minimal", "--output", "out"]).unwrap();
        match cli.command {
            Some(Commands::New(cmd)) => {
                assert_eq!(cmd.name, "shop");
                assert!(cmd.minimal);
                assert_eq!(cmd.output.as_deref(), Some("out"));
            }
            _ => panic!("expected new"),
        }
    }

    #[test]
    fn test_cli_parse_kebab_commands() {
        assert!(Cli::try_parse_from(["bmb", "generate-crud", "Product", "--force"]).is_ok());
        assert!(Cli::try_parse_from(["bmb", "list-routes"]).is_ok());
        assert!(Cli::try_parse_from(["bmb", "strip-accents", "src"]).is_ok());
        assert!(Cli::try_parse_from(["bmb", "bump-version", "1.0.2", "1.0.3"]).is_ok());
    }

    #[test]
    fn test_cli_parse_create_fields() {
        let cli = Cli::try_parse_from([
            "bmb",
            "create",
            "Post",
            "--fields",
            "title:string",
            "body:text",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Create(cmd)) => {
                assert_eq!(cmd.model, "Post");
                assert_eq!(cmd.fields, vec!["title:string", "body:text"]);
                assert!(!cmd.skip_generate);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_missing_or_unknown_subcommand_prints_usage() {
        assert!(Cli::parse_from_args(["bmb"]).unwrap().is_none());
        assert!(Cli::parse_from_args(["bmb", "frobnicate"]).unwrap().is_none());
        assert!(Cli::parse_from_args(["bmb", "info"]).unwrap().is_some());
    }

    #[test]
    fn test_bad_arguments_are_errors() {
        assert!(Cli::parse_from_args(["bmb", "init"]).is_err());
        assert!(Cli::parse_from_args(["bmb", "run", "--port", "http"]).is_err());
    }
}
