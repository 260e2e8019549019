use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE_NAME: &str = ".blackjack.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid rule: {0}")]
    InvalidRule(#[from] blackjack::RuleError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub chart: ConfigChart,
    pub simulation: ConfigSimulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub dealer_stand_threshold: u8,
}

impl Default for ConfigRule {
    fn default() -> Self {
        Self {
            dealer_stand_threshold: blackjack::Rule::default().dealer_stand_threshold,
        }
    }
}

impl TryFrom<ConfigRule> for blackjack::Rule {
    type Error = ConfigError;

    fn try_from(config_rule: ConfigRule) -> Result<blackjack::Rule, Self::Error> {
        let blackjack_rule = blackjack::Rule::new(config_rule.dealer_stand_threshold)?;

        Ok(blackjack_rule)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigChart {
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSimulation {
    pub rounds: u64,
    pub seed: Option<u64>,
}

impl Default for ConfigSimulation {
    fn default() -> Self {
        Self {
            rounds: 100_000,
            seed: None,
        }
    }
}

/// Parses the content of a config file.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let path = filename.as_ref();
    let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&file_content)
}

/// Path of the config file in the home directory, if it exists.
pub fn default_config_path() -> Option<PathBuf> {
    let config_file_path = home::home_dir()?.join(DEFAULT_CONFIG_FILE_NAME);
    if config_file_path.is_file() {
        Some(config_file_path)
    } else {
        None
    }
}
