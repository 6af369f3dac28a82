pub mod toml_config;

use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.pgatour.com";
pub const DEFAULT_DESCRIPTION_YEAR: u16 = 2019;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub fn current_season() -> u16 {
    chrono::Local::now().year() as u16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "golf-stats-etl"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Scrape PGA TOUR stats into per-season and merged CSV datasets")
)]
pub struct CliConfig {
    /// Base directory; files are written under <output_path>/stats
    #[cfg_attr(feature = "cli", arg(long, default_value = "./"))]
    pub output_path: String,

    /// Seasons to collect, e.g. --years 2017,2018,2019
    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_values_t = vec![current_season()])
    )]
    pub years: Vec<u16>,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_BASE_URL))]
    pub base_url: String,

    /// Season page the stat descriptions are read from
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_DESCRIPTION_YEAR))]
    pub description_year: u16,

    /// Reuse stats/links/StatLinks_Descriptions.csv when it exists
    #[cfg_attr(feature = "cli", arg(long))]
    pub reuse_descriptions: bool,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS))]
    pub timeout_seconds: u64,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_USER_AGENT))]
    pub user_agent: String,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log process CPU and memory per phase"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_path: "./".to_string(),
            years: vec![current_season()],
            base_url: DEFAULT_BASE_URL.to_string(),
            description_year: DEFAULT_DESCRIPTION_YEAR,
            reuse_descriptions: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verbose: false,
            monitor: false,
            json_logs: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn years(&self) -> &[u16] {
        &self.years
    }

    fn description_year(&self) -> u16 {
        self.description_year
    }

    fn reuse_descriptions(&self) -> bool {
        self.reuse_descriptions
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_years("years", &self.years)?;
        validation::validate_range(
            "description_year",
            self.description_year,
            validation::MIN_SEASON,
            validation::MAX_SEASON,
        )?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validation::validate_non_empty_string("user_agent", &self.user_agent)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.years(), &[current_season()]);
        assert_eq!(config.description_year(), 2019);
    }

    #[test]
    fn test_invalid_years_rejected() {
        let config = CliConfig {
            years: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_cli_flags() {
        let config = CliConfig::try_parse_from([
            "golf-stats-etl",
            "--output-path",
            "/tmp/golf/",
            "--years",
            "2017,2018",
            "--reuse-descriptions",
            "--timeout-seconds",
            "10",
        ])
        .unwrap();

        assert_eq!(config.output_path, "/tmp/golf/");
        assert_eq!(config.years, vec![2017, 2018]);
        assert!(config.reuse_descriptions);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }
}
