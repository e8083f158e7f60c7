use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::entity::EntityKind;
use crate::graphql::DEFAULT_ENDPOINT;
use crate::pipeline::FailurePolicy;

#[derive(Parser, Debug)]
#[command(name = "spacex-to-sqlite")]
#[command(version, about = "Load SpaceX missions, rockets and launches into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where to fetch from
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// GraphQL endpoint URL
    #[arg(long, env = "SPACEX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl EndpointArgs {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every entity kind and load it into the database
    Sync {
        /// SQLite database path (default: platform data directory)
        #[arg(env = "SPACEX_DB")]
        output_db: Option<PathBuf>,

        #[command(flatten)]
        endpoint: EndpointArgs,

        /// What to do when loading an entity fails
        #[arg(long, value_enum, default_value_t = FailurePolicy::Continue)]
        on_error: FailurePolicy,

        /// Show the full-screen progress view
        #[arg(long)]
        tui: bool,
    },

    /// Create the tables without loading anything
    Init {
        /// SQLite database path (default: platform data directory)
        #[arg(env = "SPACEX_DB")]
        output_db: Option<PathBuf>,
    },

    /// Fetch one entity kind and print the flattened rows as JSON lines
    Fetch {
        #[arg(value_enum)]
        kind: EntityKind,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Print the GraphQL query for an entity kind
    Query {
        #[arg(value_enum)]
        kind: EntityKind,
    },

    /// List all table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Whether this invocation takes over the terminal
    pub fn uses_tui(&self) -> bool {
        matches!(self.command, Commands::Sync { tui: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "spacex-to-sqlite",
            "sync",
            "space.db",
            "--endpoint",
            "http://localhost:4000/",
            "--timeout",
            "30",
            "--on-error",
            "abort",
        ])
        .unwrap();

        match cli.command {
            Commands::Sync {
                output_db,
                endpoint,
                on_error,
                tui,
            } => {
                assert_eq!(output_db, Some(PathBuf::from("space.db")));
                assert_eq!(endpoint.endpoint, "http://localhost:4000/");
                assert_eq!(endpoint.timeout, Some(30));
                assert_eq!(on_error, FailurePolicy::Abort);
                assert!(!tui);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_kind() {
        let cli = Cli::try_parse_from(["spacex-to-sqlite", "query", "launches"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Query {
                kind: EntityKind::Launches
            }
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["spacex-to-sqlite", "fetch", "capsules"]).is_err());
    }

    #[test]
    fn test_uses_tui() {
        let cli = Cli::try_parse_from(["spacex-to-sqlite", "sync", "db.sqlite", "--tui"]).unwrap();
        assert!(cli.uses_tui());
        let cli = Cli::try_parse_from(["spacex-to-sqlite", "list-tables"]).unwrap();
        assert!(!cli.uses_tui());
    }
}
