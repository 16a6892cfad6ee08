//! Runtime configuration read from the environment

use std::path::PathBuf;

use crate::constants::{DEFAULT_BACKEND_PROGRAM, DEFAULT_DB_PATH};

#[derive(Debug, Clone)]
pub struct Config {
    /// Executable implementing the scraping backend (`TWSCRAPE_BIN`)
    pub backend_program: PathBuf,
    /// Arguments placed before every backend command (`TWSCRAPE_ARGS`, whitespace-separated)
    pub backend_args: Vec<String>,
    /// Log in all stored accounts when a session opens (`TWSCRAPE_LOGIN`)
    pub login_on_open: bool,
    /// Credential store used when a request names none (`DEFAULT_DB_PATH`)
    pub default_db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_program = lookup("TWSCRAPE_BIN")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_PROGRAM.to_string());

        let backend_args = lookup("TWSCRAPE_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let login_on_open = lookup("TWSCRAPE_LOGIN")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let default_db_path = lookup("DEFAULT_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Self {
            backend_program: PathBuf::from(backend_program),
            backend_args,
            login_on_open,
            default_db_path: PathBuf::from(default_db_path),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
