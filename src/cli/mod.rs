//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `token` - Trade an exchange token for an access/refresh pair
//! - `all` - List every object of an entity
//! - `get` - Fetch one object
//! - `query` - Run a criteria query
//! - `criteria` - Print a criteria document without sending it

mod commands;
mod runner;

pub use commands::{Cli, Commands, CriteriaArgs, OutputFormat};
pub use runner::Runner;
