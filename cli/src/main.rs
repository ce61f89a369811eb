use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use notion_kanban_client::ops::{self, QueryOptions};
use notion_kanban_client::{
    ClientConfig, ClientSettings, Envelope, HttpClient, KanbanError, Result,
};
use notion_kanban_core::SchemaCache;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive for stderr logging.
const LOG_ENV: &str = "NOTION_TOOL_LOG";

#[derive(Debug, Parser)]
#[command(name = "notion-tool", version)]
#[command(about = "CLI tool for interacting with Notion kanban boards")]
struct Cli {
    /// YAML file overriding base_url, api_version or timeout_secs.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read and display item details.
    Read(ReadArgs),
    /// Update item status.
    UpdateStatus(UpdateStatusArgs),
    /// Query items from the database.
    Query(QueryArgs),
    /// List all available status options.
    ListStatus(DatabaseArgs),
    /// List all available tag options.
    ListTags(DatabaseArgs),
    /// Get database schema.
    Schema(DatabaseArgs),
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Notion database ID.
    #[arg(long, short)]
    database: String,
}

#[derive(Debug, Args)]
struct ReadArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    /// ID of the item to read.
    item_id: String,
}

#[derive(Debug, Args)]
struct UpdateStatusArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    /// ID of the item to update.
    item_id: String,
    /// New status value.
    status: String,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    /// Filter by status.
    #[arg(long, short)]
    status: Option<String>,
    /// Filter by tags (comma-separated, all must match).
    #[arg(long, short)]
    tags: Option<String>,
    /// Custom filter (e.g. 'priority=high'); overrides --status and --tags.
    #[arg(long, short)]
    filter: Option<String>,
    /// Maximum number of results.
    #[arg(long, short)]
    limit: Option<u32>,
    /// Continuation token from a previous query's next_cursor.
    #[arg(long)]
    cursor: Option<String>,
}

impl From<&QueryArgs> for QueryOptions {
    fn from(args: &QueryArgs) -> Self {
        Self {
            status: args.status.clone(),
            tags: args.tags.clone(),
            filter: args.filter.clone(),
            limit: args.limit,
            start_cursor: args.cursor.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !run(cli) {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs the command and prints its envelope. Returns `true` on success.
fn run(cli: Cli) -> bool {
    let api = match connect(cli.config.as_deref()) {
        Ok(api) => api,
        Err(err) => return emit::<()>(Err(err)),
    };
    let mut cache = SchemaCache::new();

    match cli.command {
        Command::Read(args) => {
            debug!(database = %args.db.database, item_id = %args.item_id, "read");
            emit(ops::read_item(&api, &args.item_id))
        }
        Command::UpdateStatus(args) => emit(ops::update_status(
            &api,
            &mut cache,
            &args.db.database,
            &args.item_id,
            &args.status,
        )),
        Command::Query(args) => emit(ops::query_items(
            &api,
            &mut cache,
            &args.db.database,
            &QueryOptions::from(&args),
        )),
        Command::ListStatus(args) => {
            emit(ops::list_status_options(&api, &mut cache, &args.database))
        }
        Command::ListTags(args) => emit(ops::list_tag_options(&api, &mut cache, &args.database)),
        Command::Schema(args) => emit(ops::simplified_schema(&api, &mut cache, &args.database)),
    }
}

/// Loads settings, reads the credential and builds the HTTP client.
///
/// Fails before any request is made when the credential is missing.
fn connect(config_path: Option<&Path>) -> Result<HttpClient> {
    let settings = match config_path {
        Some(path) => ClientSettings::load(path).map_err(|err| {
            KanbanError::Config(format!("failed to load '{}': {err}", path.display()))
        })?,
        None => ClientSettings::default(),
    };
    let config = ClientConfig::from_env(&settings)?;
    debug!(?config, "Loaded client configuration");
    HttpClient::new(&config)
}

fn emit<T: Serialize>(result: Result<T>) -> bool {
    let envelope = Envelope::from_result(result);
    match envelope.to_json_pretty() {
        Ok(json) => {
            println!("{json}");
            envelope.success
        }
        Err(err) => {
            let fallback = Envelope::<()>::failure(err.to_payload());
            match fallback.to_json_pretty() {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("error: {err}"),
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_args_parse() {
        let cli = Cli::try_parse_from([
            "notion-tool",
            "query",
            "-d",
            "db1",
            "--status",
            "In Progress",
            "-t",
            "a,b",
            "--filter",
            "priority=high",
            "-l",
            "5",
            "--cursor",
            "c1",
        ])
        .unwrap();

        let Command::Query(args) = cli.command else {
            panic!("expected query command");
        };
        let options = QueryOptions::from(&args);
        assert_eq!(args.db.database, "db1");
        assert_eq!(options.status.as_deref(), Some("In Progress"));
        assert_eq!(options.tags.as_deref(), Some("a,b"));
        assert_eq!(options.filter.as_deref(), Some("priority=high"));
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.start_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_update_status_positional_args() {
        let cli = Cli::try_parse_from([
            "notion-tool",
            "update-status",
            "--database",
            "db1",
            "page-1",
            "Done",
        ])
        .unwrap();

        let Command::UpdateStatus(args) = cli.command else {
            panic!("expected update-status command");
        };
        assert_eq!(args.item_id, "page-1");
        assert_eq!(args.status, "Done");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notion-tool",
            "list-tags",
            "-d",
            "db1",
            "-v",
            "--config",
            "settings.yml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("settings.yml")));
        assert!(matches!(cli.command, Command::ListTags(_)));
    }

    #[test]
    fn test_database_is_required() {
        assert!(Cli::try_parse_from(["notion-tool", "schema"]).is_err());
    }
}
