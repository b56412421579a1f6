//! CLI commands and argument parsing

use crate::error::Result;
use crate::query::{Direction, Query};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Winbooks on Web API client
#[derive(Parser, Debug)]
#[command(name = "winbooks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder to work on (overrides the configuration)
    #[arg(short, long, global = true)]
    pub folder: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trade an e-mail and exchange token for an access/refresh token pair
    Token {
        /// E-mail of the API user
        email: String,

        /// Exchange token obtained from the web application
        exchange_token: String,
    },

    /// List every object of an entity (e.g. `Customers`)
    All {
        /// Plural entity name
        oms: String,
    },

    /// Fetch one object
    Get {
        /// Singular entity name (e.g. `Customer`)
        om: String,

        /// Object code
        code: String,

        /// Depth of nested objects to expand
        #[arg(long, default_value = "1")]
        max_level: u32,
    },

    /// Run a criteria query
    Query {
        /// Plural entity name
        oms: String,

        /// Raw criteria document (JSON), sent as is
        #[arg(long, conflicts_with_all = ["select", "filters", "order_by", "with", "take", "skip"])]
        document: Option<String>,

        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Print the criteria document of a query without sending it
    Criteria {
        /// Entity name (singular, plural or full type)
        entity: String,

        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

/// Query-building flags shared by `query` and `criteria`
#[derive(Args, Debug, Default, Clone)]
pub struct CriteriaArgs {
    /// Properties to select (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Condition as `property,value` or `property,operator,value` (repeatable)
    #[arg(long = "where", id = "filters")]
    pub filters: Vec<String>,

    /// Declared relations to join (repeatable)
    #[arg(long)]
    pub with: Vec<String>,

    /// Properties to order by (repeatable)
    #[arg(long)]
    pub order_by: Vec<String>,

    /// Order descending
    #[arg(long)]
    pub desc: bool,

    /// Maximum number of results
    #[arg(long)]
    pub take: Option<u64>,

    /// Number of results to skip
    #[arg(long)]
    pub skip: Option<u64>,
}

impl CriteriaArgs {
    /// Apply the flags to a query
    pub fn apply(&self, query: Query) -> Result<Query> {
        let mut query = query;

        if !self.select.is_empty() {
            query = query.select(self.select.iter())?;
        }

        for filter in &self.filters {
            query = query.filter_definition(&parse_filter(filter))?;
        }

        for relation in &self.with {
            query = query.with(relation)?;
        }

        let direction = if self.desc {
            Direction::Desc
        } else {
            Direction::Asc
        };
        for property in &self.order_by {
            query = query.order_by_direction(property, direction)?;
        }

        if self.skip.is_some() {
            query = query.skip(self.skip);
        }
        if self.take.is_some() {
            query = query.take(self.take);
        }

        Ok(query)
    }
}

/// Split a `--where` flag into a loose condition definition. The value is
/// read as JSON when it parses, as a plain string otherwise.
fn parse_filter(raw: &str) -> Vec<Value> {
    let parts: Vec<&str> = raw.splitn(3, ',').map(str::trim).collect();
    let last = parts.len().saturating_sub(1);

    parts
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            if idx == last && idx > 0 {
                serde_json::from_str(part).unwrap_or_else(|_| Value::String((*part).to_string()))
            } else {
                Value::String((*part).to_string())
            }
        })
        .collect()
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "winbooks",
            "--folder",
            "DEMO",
            "query",
            "Customers",
            "--select",
            "Id,Code",
            "--where",
            "Code,ARTHUR",
            "--take",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.folder.as_deref(), Some("DEMO"));
        match cli.command {
            Commands::Query { oms, criteria, document } => {
                assert_eq!(oms, "Customers");
                assert!(document.is_none());
                assert_eq!(criteria.select, vec!["Id", "Code"]);
                assert_eq!(criteria.filters, vec!["Code,ARTHUR"]);
                assert_eq!(criteria.take, Some(10));
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_document_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "winbooks",
            "query",
            "Customers",
            "--document",
            "{}",
            "--take",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("Code,ARTHUR"), vec![json!("Code"), json!("ARTHUR")]);
        assert_eq!(
            parse_filter("Amount, >=, 100"),
            vec![json!("Amount"), json!(">="), json!(100)]
        );
        assert_eq!(
            parse_filter("Code,in,[\"A\",\"B\"]"),
            vec![json!("Code"), json!("in"), json!(["A", "B"])]
        );
    }

    #[test]
    fn test_criteria_args_apply() {
        let args = CriteriaArgs {
            select: vec!["Id".into(), "Code".into()],
            filters: vec!["Code,ARTHUR".into()],
            with: vec!["third".into()],
            order_by: vec!["Code".into()],
            desc: true,
            take: Some(5),
            skip: None,
        };

        let query = args.apply(Query::new(ModelKind::Customer)).unwrap();
        let doc = query.to_document().unwrap();

        assert_eq!(doc["ProjectionsList"].as_array().map(Vec::len), Some(2));
        assert_eq!(doc["Conditions"][0]["Values"], json!(["ARTHUR"]));
        assert!(doc["Association"].get("third").is_some());
        assert_eq!(doc["Orders"][0]["Ascending"], json!(false));
        assert_eq!(doc["FirstResult"], json!(0));
        assert_eq!(doc["MaxResult"], json!(5));
    }
}
