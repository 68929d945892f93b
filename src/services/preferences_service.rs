use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPreferences {
    #[serde(default)]
    pub has_seen_welcome: bool,
}

/// Client-side preferences file. Loaded at start-up, removed on logout.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
    current: LocalPreferences,
}

impl PreferencesStore {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let current = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable preferences, using defaults");
                    LocalPreferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LocalPreferences::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, current })
    }

    pub fn preferences(&self) -> &LocalPreferences {
        &self.current
    }

    /// Whether the welcome modal should open.
    pub fn should_show_welcome(&self) -> bool {
        !self.current.has_seen_welcome
    }

    pub async fn mark_welcome_seen(&mut self) -> Result<()> {
        if self.current.has_seen_welcome {
            return Ok(());
        }
        self.current.has_seen_welcome = true;
        self.save().await
    }

    async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&self.current)?;
        fs::write(&self.path, body).await?;
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.current = LocalPreferences::default();
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Local preferences cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
