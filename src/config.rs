use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::menu::Menu;

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub menu_file: Option<PathBuf>,
    pub api_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            menu_file: None,
            api_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidInput(format!("PORT is not a port number: {}", port)))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            menu_file: lookup("MENU_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            api_keys: lookup("API_KEYS")
                .map(|keys| parse_api_keys(&keys))
                .unwrap_or_default(),
        })
    }

    pub fn addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("invalid address {}:{}", self.host, self.port)))
    }

    /// The configured menu file, or the built-in reference menu.
    pub fn load_menu(&self) -> AppResult<Menu> {
        match &self.menu_file {
            Some(path) => Menu::load(path),
            None => Ok(Menu::default()),
        }
    }
}

fn parse_api_keys(keys: &str) -> Vec<String> {
    keys.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
