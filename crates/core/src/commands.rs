use anyhow::{bail, Result};

use crate::config::AppConfig;
use crate::controller::TodoController;
use crate::remote::RemoteStore;

/// Build a controller talking to the configured remote store.
pub fn connect(config: &AppConfig) -> Result<TodoController<RemoteStore>> {
    if !config.has_user() {
        bail!("no user id configured: pass --user-id or set TODOS_USER_ID");
    }
    let store = RemoteStore::new(config)?;
    Ok(TodoController::from_config(store, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn connect_requires_a_user() {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf())
            .expect("config")
            .with_user_id(0);
        let err = connect(&config).err().expect("missing user rejected");
        assert!(err.to_string().contains("no user id"));
    }

    #[test]
    fn connect_scopes_controller_to_configured_user() {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf())
            .expect("config")
            .with_user_id(77);
        let controller = connect(&config).expect("controller");
        assert_eq!(controller.user_id(), 77);
    }
}
