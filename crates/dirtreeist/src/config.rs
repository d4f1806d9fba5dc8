use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use dirtree_core::GeneratorOptions;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

pub const CONFIG_PATH_ENV: &str = "DIRTREEIST_CONFIG_PATH";
pub const CONFIG_DIR_ENV: &str = "DIRTREEIST_CONFIG_DIR";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted plugin settings. The stored record is exactly the generator
/// options.
pub type Settings = GeneratorOptions;

/// Loads and saves [`Settings`] as a JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Store at the location given by the environment, falling back to the
    /// platform config directory.
    pub fn from_env() -> Self {
        Self::new(resolve_path(
            std::env::var_os(CONFIG_PATH_ENV),
            std::env::var_os(CONFIG_DIR_ENV),
        ))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Defaults overlaid with whatever the settings file provides.
    ///
    /// Never writes: a missing, empty or unparsable file yields defaults and
    /// is left as it is until the next [`save`](Self::save).
    pub async fn load(&self) -> Result<Settings> {
        let Some(path) = self.path() else {
            log::debug!("No settings location available, using defaults");
            return Ok(Settings::default());
        };

        if !try_exists(path).await? {
            log::info!("Settings file does not exist, using defaults");
            return Ok(Settings::default());
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read settings file: {}", e);
                return Ok(Settings::default());
            }
        };

        if content.trim().is_empty() {
            log::warn!("Settings file is empty, using defaults");
            return Ok(Settings::default());
        }

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => {
                let settings = Settings::from_json(&value);
                log::info!("Loaded settings from: {}", path.display());
                Ok(settings)
            }
            Err(json_err) => {
                log::error!("Failed to parse settings file: {}", json_err);
                Ok(Settings::default())
            }
        }
    }

    /// Write `settings` as pretty JSON. A broken file about to be replaced
    /// is first copied to `.bak`.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        let path = self
            .path()
            .ok_or_else(|| anyhow!("No settings location available; settings were not saved"))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow!(
                    "Failed to create settings directory: {} - {}",
                    parent.display(),
                    e
                )
            })?;
        }

        self.backup_if_broken(path).await;

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| anyhow!("Failed to serialize settings: {}", e))?;
        tokio::fs::write(path, content).await.map_err(|e| {
            anyhow!("Failed to write settings file: {} - {}", path.display(), e)
        })?;

        log::info!("Saved settings to: {}", path.display());
        Ok(())
    }

    async fn backup_if_broken(&self, path: &Path) {
        let Ok(content) = tokio::fs::read_to_string(path).await else {
            return;
        };
        if content.trim().is_empty()
            || serde_json::from_str::<serde_json::Value>(&content).is_ok()
        {
            return;
        }

        let backup_path = path.with_extension("bak");
        if let Err(e) = tokio::fs::copy(path, &backup_path).await {
            log::warn!("Failed to backup broken settings: {}", e);
        } else {
            log::info!("Backed up broken settings to: {}", backup_path.display());
        }
    }
}

fn resolve_path(path_var: Option<OsString>, dir_var: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = path_var {
        return Some(PathBuf::from(path));
    }

    if let Some(dir) = dir_var {
        return Some(PathBuf::from(dir).join(SETTINGS_FILE));
    }

    ProjectDirs::from("com", "dirtreeist", "dirtreeist")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtree_core::TreeType;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(Some(dir.path().join(SETTINGS_FILE)))
    }

    #[test]
    fn test_resolve_path_precedence() {
        let explicit = resolve_path(Some("/tmp/a.json".into()), Some("/tmp/dir".into()));
        assert_eq!(explicit, Some(PathBuf::from("/tmp/a.json")));

        let from_dir = resolve_path(None, Some("/tmp/dir".into()));
        assert_eq!(from_dir, Some(PathBuf::from("/tmp/dir/settings.json")));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_created_by_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!dir.path().join(SETTINGS_FILE).exists());
    }

    #[tokio::test]
    async fn test_partial_file_is_defaulted_field_by_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "treeType": "bold", "spaceSize": 4, "unrelated": 1 }"#,
        )
        .await
        .unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings.tree_type, TreeType::Bold);
        assert_eq!(settings.space_size, 4);
        assert!(settings.space_before_name);
        assert!(!settings.empty_before_upper_hierarche);
    }

    #[tokio::test]
    async fn test_broken_file_is_left_alone_by_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(dir.path().join(SETTINGS_FILE), "{ not json")
            .await
            .unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!dir.path().join("settings.bak").exists());

        let content = tokio::fs::read_to_string(dir.path().join(SETTINGS_FILE))
            .await
            .unwrap();
        assert_eq!(content, "{ not json");
    }

    #[tokio::test]
    async fn test_save_backs_up_broken_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(dir.path().join(SETTINGS_FILE), "{ not json")
            .await
            .unwrap();

        store.save(&Settings::default()).await.unwrap();

        let backup = tokio::fs::read_to_string(dir.path().join("settings.bak"))
            .await
            .unwrap();
        assert_eq!(backup, "{ not json");
        assert_eq!(store.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_save_over_valid_file_skips_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Settings::default()).await.unwrap();
        store.save(&Settings::default()).await.unwrap();
        assert!(!dir.path().join("settings.bak").exists());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(Some(dir.path().join("nested").join(SETTINGS_FILE)));
        let settings = Settings {
            tree_type: TreeType::Ascii,
            empty_before_upper_hierarche: true,
            space_before_name: false,
            space_size: 1,
        };

        store.save(&settings).await.unwrap();
        let written = tokio::fs::read_to_string(store.path().unwrap())
            .await
            .unwrap();
        assert!(written.contains("\"treeType\": \"ascii\""));

        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_no_location_loads_defaults_but_cannot_save() {
        let store = SettingsStore::new(None);
        assert_eq!(store.load().await.unwrap(), Settings::default());
        let err = store.save(&Settings::default()).await.unwrap_err();
        assert!(err.to_string().contains("not saved"));
    }
}
