//! Runtime configuration, read from the environment.
//!
//! Binaries load a `.env` file first (via `dotenv`), so every value below
//! may be supplied there instead.
//!
//! ```bash
//! ROUTES_DATABASE=routesdatabase.json
//! ROUTES_PERSIST=immediate        # or `deferred`
//! ROUTES_LOOP_POLICY=preserve     # or `collapse`
//! APP_PORT=9001
//! ALLOWED_ORIGINS=http://localhost:3000,https://example.com
//! ROUTES_ADMIN_USER=dispatch
//! ROUTES_ADMIN_EMAIL=dispatch@example.com
//! ROUTES_ADMIN_PASSWORD=...
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::persist::json::DEFAULT_DATABASE;
use crate::persist::PersistMode;
use crate::route::LoopPolicy;

pub const DATABASE: &str = "ROUTES_DATABASE";
pub const PERSIST: &str = "ROUTES_PERSIST";
pub const LOOP_POLICY: &str = "ROUTES_LOOP_POLICY";
pub const PORT: &str = "APP_PORT";
pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ADMIN_USER: &str = "ROUTES_ADMIN_USER";
pub const ADMIN_EMAIL: &str = "ROUTES_ADMIN_EMAIL";
pub const ADMIN_PASSWORD: &str = "ROUTES_ADMIN_PASSWORD";

const DEFAULT_PORT: u16 = 9001;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

/// An account registered with the credential store at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Location of the persisted graph.
    pub database: PathBuf,
    pub persist: PersistMode,
    pub loop_policy: LoopPolicy,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub admin: Option<SeedAccount>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: PathBuf::from(DEFAULT_DATABASE),
            persist: PersistMode::default(),
            loop_policy: LoopPolicy::default(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            admin: None,
        }
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to the
    /// default for every unset key.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let admin = match (get(ADMIN_USER), get(ADMIN_PASSWORD)) {
            (Some(username), Some(password)) => Some(SeedAccount {
                email: get(ADMIN_EMAIL).unwrap_or_default(),
                username,
                password,
            }),
            (Some(_), None) => return Err(ConfigError::Incomplete(ADMIN_USER, ADMIN_PASSWORD)),
            (None, Some(_)) => return Err(ConfigError::Incomplete(ADMIN_PASSWORD, ADMIN_USER)),
            (None, None) => None,
        };

        Ok(Config {
            database: get(DATABASE).map(PathBuf::from).unwrap_or(defaults.database),
            persist: parse(PERSIST, get(PERSIST))?.unwrap_or(defaults.persist),
            loop_policy: parse(LOOP_POLICY, get(LOOP_POLICY))?.unwrap_or(defaults.loop_policy),
            port: parse(PORT, get(PORT))?.unwrap_or(defaults.port),
            allowed_origins: get(ALLOWED_ORIGINS)
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            admin,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .to_lowercase()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
