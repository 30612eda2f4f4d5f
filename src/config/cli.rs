use crate::config::toml_config::{FilterConfig, LoggingConfig};
use crate::core::query::{DomainKind, Literal};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "tslist")]
#[command(about = "Filter JSON arrays and objects by number or timestamp ranges")]
pub struct CliConfig {
    #[arg(short, long, help = "TOML file with a [filter] section")]
    pub config: Option<String>,

    #[arg(short, long, help = "JSON input file, stdin when omitted")]
    pub input: Option<String>,

    #[arg(long, help = "Comparison domain: number or timestamp")]
    pub domain: Option<DomainKind>,

    #[arg(long, allow_hyphen_values = true, help = "Inclusive lower bound")]
    pub start: Option<Literal>,

    #[arg(long, allow_hyphen_values = true, help = "Exclusive upper bound")]
    pub stop: Option<Literal>,

    #[arg(long, allow_hyphen_values = true, help = "Select values equal to this one")]
    pub at: Option<Literal>,

    #[arg(long, allow_hyphen_values = true, help = "Keep every n-th match")]
    pub step: Option<i64>,

    #[arg(long, help = "Filter objects by key instead of value")]
    pub keys: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Configuration file values with command line flags on top.
    pub fn to_filter_config(&self) -> Result<FilterConfig> {
        let mut config = match &self.config {
            Some(path) => FilterConfig::from_file(path)?,
            None => FilterConfig::default(),
        };

        let filter = &mut config.filter;
        if let Some(domain) = self.domain {
            filter.domain = domain;
        }
        if self.start.is_some() || self.stop.is_some() || self.at.is_some() {
            filter.start = self.start.clone();
            filter.stop = self.stop.clone();
            filter.at = self.at.clone();
        }
        if self.step.is_some() {
            filter.step = self.step;
        }
        filter.by_keys |= self.keys;

        if self.verbose || self.json_logs {
            let logging = config.logging.get_or_insert_with(LoggingConfig::default);
            if self.verbose {
                logging.verbose = Some(true);
            }
            if self.json_logs {
                logging.json = Some(true);
            }
        }

        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        if let Some(path) = &self.input {
            validation::validate_path("input", path)?;
        }
        Ok(())
    }
}
