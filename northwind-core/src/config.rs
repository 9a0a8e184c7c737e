//! Service configuration loaded from TOML.
//!
//! Lookup order for the file (first existing wins, defaults when none):
//! 1. `$NORTHWIND_CONFIG`
//! 2. `./northwind.toml`
//! 3. `~/.northwind/config.toml`
//!
//! Connection strings support `${VAR}` expansion from the environment, and
//! `DATABASE_URL` overrides the default connection.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NorthwindError, Result};

/// Name of the connection string used by the service
pub const DEFAULT_CONNECTION: &str = "DefaultConnection";

/// Environment variable that overrides the default connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "NORTHWIND_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NorthwindConfig {
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub benchmark: BenchmarkSection,
}

/// Named connection strings, e.g. `DefaultConnection = "postgres://..."`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionStrings(pub HashMap<String, String>);

impl ConnectionStrings {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    pub max_connections: u32,
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            max_connections: 5,
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSection {
    /// Iterations per benchmark run
    pub iterations: u32,
    /// Product name substring the benchmarks query for
    pub name: String,
}

impl Default for BenchmarkSection {
    fn default() -> Self {
        Self {
            iterations: 5000,
            name: "chef".to_string(),
        }
    }
}

impl NorthwindConfig {
    /// Load config from the first existing location, or defaults.
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| NorthwindError::config_parse(path, e))?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// First existing config file in lookup order
    pub fn locate() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|p| p.is_file())
    }

    /// Config file candidates in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("northwind.toml"));
        if let Some(dir) = config_dir() {
            paths.push(dir.join("config.toml"));
        }
        paths
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.max_connections == 0 {
            return Err(NorthwindError::config("server.max_connections must be at least 1"));
        }
        if self.benchmark.iterations == 0 {
            return Err(NorthwindError::config("benchmark.iterations must be at least 1"));
        }
        Ok(())
    }

    /// Resolve a named connection string.
    ///
    /// `DATABASE_URL` wins for the default connection; otherwise the
    /// configured value is returned with `${VAR}` references expanded.
    pub fn connection_string(&self, name: &str) -> Result<String> {
        let env_override = if name == DEFAULT_CONNECTION {
            env::var(DATABASE_URL_ENV).ok().filter(|v| !v.is_empty())
        } else {
            None
        };
        self.resolve_connection_string(name, env_override, |var| env::var(var).ok())
    }

    fn resolve_connection_string(
        &self,
        name: &str,
        env_override: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        if let Some(url) = env_override {
            return Ok(url);
        }

        self.connection_strings
            .get(name)
            .map(|raw| expand_vars(raw, &lookup))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| NorthwindError::missing_connection_string(name))
    }
}

/// Config directory: `~/.northwind`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".northwind"))
}

/// Expand `${VAR}` references; unknown variables expand to nothing.
fn expand_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                out.push_str(&lookup(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference, keep verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
