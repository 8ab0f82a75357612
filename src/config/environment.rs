//! Deployment environment selecting the `config/{environment}.toml` overlay.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

/// Accepted spellings, canonical name first.
const NAMES: [(Environment, &[&str]); 4] = [
    (Environment::Development, &["development", "dev"]),
    (Environment::Test, &["test"]),
    (Environment::Staging, &["staging", "stage"]),
    (Environment::Production, &["production", "prod"]),
];

impl Environment {
    /// Variable consulted by [`Environment::from_env`].
    pub const ENV_VAR: &'static str = "TODO_APP_ENV";

    /// Reads `TODO_APP_ENV`. Unset or unrecognised values mean `Development`.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(env, _)| env == self)
            .map(|(_, names)| names[0])
            .unwrap_or("development")
    }

    /// File name of this environment's overlay, e.g. `production.toml`.
    pub fn overlay_file_name(&self) -> String {
        format!("{}.toml", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        NAMES
            .iter()
            .find(|(_, names)| names.contains(&wanted.as_str()))
            .map(|(env, _)| *env)
            .ok_or_else(|| {
                ConfigError::InvalidEnvironment(format!(
                    "'{}' (expected development, test, staging or production)",
                    s
                ))
            })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
