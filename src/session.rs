use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::error::StoreError;
use crate::model::{MeasurementSystem, StructuredRecipe};

/// Per-user preferences, persisted across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_language")]
    pub ui_language: String,
    #[serde(default = "default_language")]
    pub target_language: String,
    #[serde(default)]
    pub measurement_system: MeasurementSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mealie_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mealie_api_token: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            ui_language: default_language(),
            target_language: default_language(),
            measurement_system: MeasurementSystem::default(),
            mealie_url: None,
            mealie_api_token: None,
        }
    }
}

impl UserSettings {
    /// First-run settings seeded from the configuration file
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ui_language: config.defaults.ui_language.clone(),
            target_language: config.defaults.target_language.clone(),
            measurement_system: config.defaults.measurement_system,
            mealie_url: config.mealie.url.clone(),
            mealie_api_token: config.mealie.api_token.clone(),
        }
    }
}

/// Holds the single in-progress recipe and the user's settings.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_recipe(&self) -> Result<Option<StructuredRecipe>, StoreError>;

    /// Replaces whatever recipe was stored before
    async fn save_recipe(&self, recipe: &StructuredRecipe) -> Result<(), StoreError>;

    async fn clear_recipe(&self) -> Result<(), StoreError>;

    async fn load_settings(&self) -> Result<UserSettings, StoreError>;

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError>;
}

/// Process-local store; everything is lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    recipe: RwLock<Option<StructuredRecipe>>,
    settings: RwLock<UserSettings>,
}

impl MemoryStore {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            recipe: RwLock::new(None),
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_recipe(&self) -> Result<Option<StructuredRecipe>, StoreError> {
        Ok(self.recipe.read().await.clone())
    }

    async fn save_recipe(&self, recipe: &StructuredRecipe) -> Result<(), StoreError> {
        *self.recipe.write().await = Some(recipe.clone());
        Ok(())
    }

    async fn clear_recipe(&self) -> Result<(), StoreError> {
        *self.recipe.write().await = None;
        Ok(())
    }

    async fn load_settings(&self) -> Result<UserSettings, StoreError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        *self.settings.write().await = settings.clone();
        Ok(())
    }
}

const RECIPE_FILE: &str = "recipe.json";
const SETTINGS_FILE: &str = "settings.json";

/// JSON files in a data directory: `recipe.json` and `settings.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    initial_settings: UserSettings,
}

impl FileStore {
    /// `initial_settings` are returned until settings are first saved
    pub fn new(dir: impl Into<PathBuf>, initial_settings: UserSettings) -> Self {
        Self {
            dir: dir.into(),
            initial_settings,
        }
    }

    async fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StoreError> {
        let path = self.dir.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file);
        let bytes = serde_json::to_vec_pretty(value)?;
        write_replacing(&path, &bytes).await?;
        debug!("Saved {}", path.display());
        Ok(())
    }
}

/// Write to a sibling temp file then rename, so readers never see half a file
async fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load_recipe(&self) -> Result<Option<StructuredRecipe>, StoreError> {
        self.read(RECIPE_FILE).await
    }

    async fn save_recipe(&self, recipe: &StructuredRecipe) -> Result<(), StoreError> {
        self.write(RECIPE_FILE, recipe).await
    }

    async fn clear_recipe(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.dir.join(RECIPE_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_settings(&self) -> Result<UserSettings, StoreError> {
        Ok(self
            .read(SETTINGS_FILE)
            .await?
            .unwrap_or_else(|| self.initial_settings.clone()))
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        self.write(SETTINGS_FILE, settings).await
    }
}
