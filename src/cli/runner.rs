//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, CriteriaArgs, OutputFormat};
use crate::client::{criteria_for, QueryInput, Winbooks};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::query::Query;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Token {
                email,
                exchange_token,
            } => self.token(email, exchange_token).await,
            Commands::All { oms } => {
                let collection = self.client()?.all(oms).await?;
                self.output(&collection)
            }
            Commands::Get {
                om,
                code,
                max_level,
            } => {
                let value = self.client()?.get(om, code, *max_level).await?;
                self.output(&value)
            }
            Commands::Query {
                oms,
                document,
                criteria,
            } => self.query(oms, document.as_deref(), criteria).await,
            Commands::Criteria { entity, criteria } => {
                let document = criteria_for(entity.as_str(), |query| criteria.apply(query))?;
                self.output(&document)
            }
        }
    }

    /// Load configuration: YAML file (if given), then environment, then flags
    fn load_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                ClientConfig::from_yaml_file(path)?
            }
            None => ClientConfig::default(),
        };

        let mut config = config.with_env_overrides()?;
        if let Some(folder) = &self.cli.folder {
            config.folder = Some(folder.clone());
        }

        Ok(config)
    }

    fn client(&self) -> Result<Winbooks> {
        Winbooks::new(self.load_config()?)
    }

    async fn token(&self, email: &str, exchange_token: &str) -> Result<()> {
        let tokens = self.client()?.authenticate(email, exchange_token).await?;
        self.output(&tokens)
    }

    async fn query(&self, oms: &str, document: Option<&str>, criteria: &CriteriaArgs) -> Result<()> {
        let input = match document {
            Some(raw) => QueryInput::Document(
                serde_json::from_str::<Value>(raw)
                    .map_err(|e| Error::config(format!("Invalid criteria JSON: {e}")))?,
            ),
            None => QueryInput::Query(criteria.apply(Query::of(oms)?)?),
        };

        let collection = self.client()?.query(oms, input).await?;
        self.output(&collection)
    }

    /// Print a value on stdout
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}
