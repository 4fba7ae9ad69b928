//! Validation subcommand

use super::CliError;
use crate::config::CrawlConfig;
use crate::identifier::SymbolIdentifier;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Validate command for checking identifiers and config files
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// What to validate
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// Target type for validation
#[derive(clap::Subcommand, Debug)]
pub enum ValidateTarget {
    /// Decompose a symbol identifier (e.g. DAP00PFBEXD000101)
    Identifier {
        /// Identifier to validate
        identifier: String,
    },
    /// Load and check a JSON crawl config
    Config {
        /// Config file path
        path: PathBuf,
    },
}

impl ValidateCommand {
    /// Execute the validation command
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.target {
            ValidateTarget::Identifier { identifier } => self.validate_identifier(identifier),
            ValidateTarget::Config { path } => self.validate_config(path),
        }
    }

    fn validate_identifier(&self, identifier: &str) -> Result<(), CliError> {
        let parts = SymbolIdentifier::parse(identifier).map_err(|e| {
            eprintln!("Invalid identifier: {e}");
            CliError::InvalidArgument(e.to_string())
        })?;
        let date = parts.date().map_err(|e| {
            eprintln!("Invalid identifier: {e}");
            CliError::InvalidArgument(e.to_string())
        })?;

        println!("Valid identifier: {identifier}");
        println!("  Bazar type: {}", parts.bazar_type);
        println!("  Product: {}", parts.product_name);
        println!("  Producer: {}", parts.producer_name);
        println!("  Contract type: {}", parts.contract_type);
        println!("  Load type: {}", parts.load_type_code);
        println!("  Delivery place: {}", parts.delivery_place);
        println!("  Delivery period: {}", parts.delivery_period);
        println!("  Delivery date: {date}");
        Ok(())
    }

    fn validate_config(&self, path: &Path) -> Result<(), CliError> {
        let config = CrawlConfig::from_json_file(path)?;
        if let Err(e) = config.validate() {
            eprintln!("Invalid config {}: {e}", path.display());
            return Err(e.into());
        }

        println!("Valid config: {}", path.display());
        println!("  Dates: {} to {}", config.start_date, config.end_date);
        println!(
            "  Load types: {}",
            config
                .load_types
                .iter()
                .map(|lt| format!("{}={}", lt.name, lt.code))
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Identifiers: {}", config.total_identifiers());
        println!("  Base URL: {}", config.base_url);
        Ok(())
    }
}
