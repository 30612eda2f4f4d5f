use crate::core::query::{DomainKind, Literal, Query};
use crate::utils::error::{Result, TsError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filter: FilterSection,
    pub logging: Option<LoggingConfig>,
}

/// Bounds are quoted strings or bare numbers; TOML date literals are not
/// accepted, write `"2024-01-01"` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub domain: DomainKind,
    pub start: Option<Literal>,
    pub stop: Option<Literal>,
    pub at: Option<Literal>,
    pub step: Option<i64>,
    #[serde(default)]
    pub by_keys: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl FilterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TsError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TsError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    // Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TsError::Config {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let filter = &self.filter;

        if let Some(step) = filter.step {
            validation::validate_positive_number("filter.step", step, 1)?;
        }

        validation::validate_exclusive(
            "filter.at",
            filter.at.is_some(),
            &[
                ("filter.start", filter.start.is_some()),
                ("filter.stop", filter.stop.is_some()),
                ("filter.step", filter.step.is_some()),
            ],
        )?;

        for (field, literal) in [
            ("filter.start", &filter.start),
            ("filter.stop", &filter.stop),
            ("filter.at", &filter.at),
        ] {
            if let Some(Literal::Text(text)) = literal {
                validation::validate_non_empty_string(field, text)?;
            }
        }

        self.query().map(|_| ())
    }

    pub fn query(&self) -> Result<Query> {
        let filter = &self.filter;
        Query::build(
            filter.domain,
            filter.start.as_ref(),
            filter.stop.as_ref(),
            filter.at.as_ref(),
            filter.step,
            filter.by_keys,
        )
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.json)
            .unwrap_or(false)
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[filter]
domain = "timestamp"
start = 20241224
stop = "2024-12-31"
step = 2

[logging]
verbose = true
"#;

        let config = FilterConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.filter.domain, DomainKind::Timestamp);
        assert_eq!(config.filter.start, Some(Literal::Integer(20241224)));
        assert_eq!(config.filter.stop, Some(Literal::Text("2024-12-31".to_string())));
        assert_eq!(config.filter.step, Some(2));
        assert!(config.verbose());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfig::from_toml_str("").unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.filter.domain, DomainKind::Number);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TSLIST_TEST_START", "1.5");

        let toml_content = r#"
[filter]
start = "${TSLIST_TEST_START}"
stop = "${TSLIST_TEST_UNSET_VARIABLE}"
"#;

        let config = FilterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.filter.start, Some(Literal::Text("1.5".to_string())));
        assert_eq!(
            config.filter.stop,
            Some(Literal::Text("${TSLIST_TEST_UNSET_VARIABLE}".to_string()))
        );
        assert!(config.validate().is_err());

        std::env::remove_var("TSLIST_TEST_START");
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[filter]\nstep = 0",
            "[filter]\nat = 1.5\nstart = 1.0",
            "[filter]\nstart = \"\"",
            "[filter]\ndomain = \"timestamp\"\nstart = \"someday\"",
        ];
        for toml_content in invalid {
            let config = FilterConfig::from_toml_str(toml_content).unwrap();
            assert!(config.validate().is_err(), "accepted: {}", toml_content);
        }
        assert!(FilterConfig::from_toml_str("[filter]\ndomain = \"colour\"").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[filter]
at = 1.1
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = FilterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.filter.at, Some(Literal::Float(1.1)));
    }
}
