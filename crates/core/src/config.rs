use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

use crate::controller::SettlementPolicy;

/// Owner whose todos are fetched and mutated unless overridden.
pub const DEFAULT_USER_ID: u64 = 2125;
pub const DEFAULT_API_URL: &str = "https://mate.academy/students-api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static DEFAULT_LOG_NAME: &str = "todos.log";
static ENV_DATA_DIR: &str = "TODOS_DATA_DIR";
static ENV_API_URL: &str = "TODOS_API_URL";
static ENV_USER_ID: &str = "TODOS_USER_ID";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "todos-cli", "todos"));

/// Values supplied on the command line; each one wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub user_id: Option<u64>,
    pub timeout: Option<Duration>,
    pub policy: Option<SettlementPolicy>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    log_path: PathBuf,
    api_url: String,
    user_id: u64,
    timeout: Duration,
    policy: SettlementPolicy,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving every setting from the provided overrides,
    /// environment variables, and defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let data_dir = resolve_data_dir(overrides.data_dir.clone())?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }

        let mut config = Self::from_data_dir(data_dir)?;
        config.api_url = match overrides.api_url {
            Some(url) => url,
            None => env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };
        config.user_id = match overrides.user_id {
            Some(id) => id,
            None => resolve_user_id_env()?,
        };
        if let Some(timeout) = overrides.timeout {
            config.timeout = timeout;
        }
        if let Some(policy) = overrides.policy {
            config.policy = policy;
        }
        Ok(config)
    }

    /// Construct [`AppConfig`] directly from a resolved data directory, with default remote settings.
    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        let log_path = data_dir.join(DEFAULT_LOG_NAME);
        Ok(Self {
            data_dir,
            log_path,
            api_url: DEFAULT_API_URL.to_string(),
            user_id: DEFAULT_USER_ID,
            timeout: DEFAULT_TIMEOUT,
            policy: SettlementPolicy::default(),
        })
    }

    pub fn with_api_url<T: Into<String>>(mut self, url: T) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Whether an owner is configured at all; 0 means "unset".
    pub fn has_user(&self) -> bool {
        self.user_id != 0
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }
}

fn resolve_user_id_env() -> Result<u64> {
    match env::var(ENV_USER_ID) {
        Ok(raw) if raw.trim().is_empty() => Ok(0),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("{} must be a number, got '{}'", ENV_USER_ID, raw)),
        Err(_) => Ok(DEFAULT_USER_ID),
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("tmp").join("dev-todos");
        return Ok(dev_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".todos"));
    }

    Ok(env::current_dir()?.join(".todos"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_data_dir_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).expect("config");

        assert_eq!(config.user_id(), DEFAULT_USER_ID);
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.log_path(), dir.path().join("todos.log"));
        assert_eq!(config.policy(), SettlementPolicy::Scoped);
        assert!(config.has_user());
    }

    #[test]
    fn discover_prefers_overrides_and_creates_data_dir() {
        let dir = TempDir::new().expect("temp dir");
        let data_dir = dir.path().join("nested");
        let config = AppConfig::discover(ConfigOverrides {
            data_dir: Some(data_dir.clone()),
            api_url: Some("http://localhost:3000/".into()),
            user_id: Some(0),
            timeout: Some(Duration::from_secs(2)),
            policy: Some(SettlementPolicy::Compatible),
        })
        .expect("discover");

        assert!(data_dir.exists());
        assert_eq!(config.api_url(), "http://localhost:3000");
        assert!(!config.has_user());
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.policy(), SettlementPolicy::Compatible);
    }
}
