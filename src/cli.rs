//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Credentials and tunables can be provided via command-line flags or
//! environment variables; each pipeline stage is its own subcommand so the
//! scheduler can run them independently.

use crate::store::StoreConfig;
use clap::{Parser, Subcommand};

/// Command-line arguments for the pipeline.
///
/// # Examples
///
/// ```sh
/// # Scrape the judgment feeds into today's raw batch
/// five_min_case scrape
///
/// # Pull yesterday's Indian Kanoon judgments into the store
/// INDIANKANOON_API_KEY=... five_min_case kanoon
///
/// # Summarize, then rebuild the derived views
/// five_min_case summarize && five_min_case build-index
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the raw, case, and news data files
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    /// Directory for the public snapshots the UI reads at load
    #[arg(long, default_value = "./public/data")]
    pub public_dir: String,

    /// Days of history the retention sweep keeps
    #[arg(long, env = "RETENTION_DAYS", default_value_t = 7)]
    pub retention_days: i64,

    /// Document store API endpoint
    #[arg(
        long,
        env = "APPWRITE_ENDPOINT",
        default_value = "https://cloud.appwrite.io/v1"
    )]
    pub store_endpoint: String,

    /// Document store project id
    #[arg(long, env = "APPWRITE_PROJECT_ID")]
    pub store_project_id: Option<String>,

    /// Server API key for the document store
    #[arg(long, env = "APPWRITE_API_KEY")]
    pub store_api_key: Option<String>,

    /// Database id within the document store
    #[arg(long, env = "APPWRITE_DB_ID")]
    pub store_database_id: Option<String>,

    /// Collection id for case documents
    #[arg(long, env = "APPWRITE_CASES_COL_ID", default_value = "cases")]
    pub cases_collection: String,

    /// Collection id for news documents
    #[arg(long, env = "APPWRITE_NEWS_COL_ID", default_value = "news")]
    pub news_collection: String,

    /// Indian Kanoon API key
    #[arg(long, env = "INDIANKANOON_API_KEY")]
    pub indiankanoon_api_key: Option<String>,

    /// CourtListener API key
    #[arg(long, env = "COURTLISTENER_API_KEY")]
    pub courtlistener_api_key: Option<String>,

    /// Gemini API key for case summaries (mock summaries without it)
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,
}

/// One pipeline stage per subcommand.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the judgment feeds and search APIs into the day's raw batch
    Scrape,
    /// Scrape the legal news feeds, dedupe, and publish the day's news
    News,
    /// Pull yesterday's judgments from the Indian Kanoon API into the store
    Kanoon,
    /// Summarize the day's raw batch into finished case records
    Summarize,
    /// Rebuild the day, search, trending, and today views
    BuildIndex,
    /// Delete records older than the retention window from the store
    Clean,
    /// Re-apply the standard access rules to stored case documents
    BackfillPerms,
}

impl Cli {
    /// Assemble the document store configuration.
    ///
    /// A missing credential is the fatal-error path for every subcommand
    /// that cannot do anything useful without the store.
    pub fn store_config(&self) -> Result<StoreConfig, String> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| format!("{} is not set", name))
        };
        Ok(StoreConfig {
            endpoint: self.store_endpoint.clone(),
            project_id: require(&self.store_project_id, "APPWRITE_PROJECT_ID")?,
            api_key: require(&self.store_api_key, "APPWRITE_API_KEY")?,
            database_id: require(&self.store_database_id, "APPWRITE_DB_ID")?,
            cases_collection: self.cases_collection.clone(),
            news_collection: self.news_collection.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommand_and_defaults() {
        let cli = Cli::parse_from(["five_min_case", "scrape"]);
        assert!(matches!(cli.command, Command::Scrape));
        assert_eq!(cli.data_dir, "./data");
        assert_eq!(cli.public_dir, "./public/data");
        assert_eq!(cli.retention_days, 7);
        assert_eq!(cli.cases_collection, "cases");
        assert_eq!(cli.news_collection, "news");
    }

    #[test]
    fn test_cli_retention_override() {
        let cli = Cli::parse_from(["five_min_case", "--retention-days", "14", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
        assert_eq!(cli.retention_days, 14);
    }

    #[test]
    fn test_store_config_requires_credentials() {
        let cli = Cli::parse_from(["five_min_case", "clean"]);
        let err = cli.store_config().unwrap_err();
        assert!(err.contains("APPWRITE_PROJECT_ID"));
    }

    #[test]
    fn test_store_config_complete() {
        let cli = Cli::parse_from([
            "five_min_case",
            "--store-project-id",
            "proj",
            "--store-api-key",
            "key",
            "--store-database-id",
            "db",
            "clean",
        ]);
        let config = cli.store_config().unwrap();
        assert_eq!(config.project_id, "proj");
        assert_eq!(config.database_id, "db");
        assert_eq!(config.cases_collection, "cases");
    }
}
