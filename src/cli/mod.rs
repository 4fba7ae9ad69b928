//! CLI command implementations

pub mod crawl;
pub mod error;
pub mod validate;

pub use crawl::{Cli, Commands, ConfigArgs, CrawlArgs, OutputFormat, PlanArgs};
pub use error::CliError;
pub use validate::ValidateCommand;
