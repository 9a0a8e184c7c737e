use std::path::PathBuf;

use tracing::debug;

use northwind_core::config::config_dir;

/// Outcome of [`load_dotenv`], logged once tracing is up
#[derive(Debug, Default)]
pub struct DotenvOutcome {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<String>,
}

impl DotenvOutcome {
    pub fn log(&self) {
        for path in &self.loaded {
            debug!("Loaded .env from {}", path.display());
        }
        for failure in &self.failed {
            debug!("Failed to load {}", failure);
        }
    }
}

/// Load environment variables from .env files.
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.northwind/.env
///
/// dotenvy never overwrites variables that are already set. Runs before the
/// subscriber exists so `RUST_LOG` / `OTEL_*` from a .env file take effect.
pub fn load_dotenv() -> DotenvOutcome {
    let mut outcome = DotenvOutcome::default();

    match dotenvy::dotenv() {
        Ok(path) => outcome.loaded.push(path),
        Err(e) if e.not_found() => {}
        Err(e) => outcome.failed.push(format!("./.env: {}", e)),
    }

    let Some(env_file) = config_dir().map(|dir| dir.join(".env")) else {
        return outcome;
    };
    if env_file.exists() {
        match dotenvy::from_path(&env_file) {
            Ok(()) => outcome.loaded.push(env_file),
            Err(e) => outcome.failed.push(format!("{}: {}", env_file.display(), e)),
        }
    }
    outcome
}
