use anyhow::Result;
use directories::ProjectDirs;
use mdxcore::{Blocklist, SanitizeOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: SanitizeOptions,
    pub blocklist: BlocklistConfig,
    pub output: OutputConfig,
}

/// Names added on top of the built-in blocklist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocklistConfig {
    pub extra_globals: Vec<String>,
    pub extra_constructors: Vec<String>,
    pub extra_properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl BlocklistConfig {
    pub fn build(&self) -> Blocklist {
        Blocklist::new()
            .with_globals(self.extra_globals.iter().cloned())
            .with_constructors(self.extra_constructors.iter().cloned())
            .with_properties(self.extra_properties.iter().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.extra_globals.is_empty()
            && self.extra_constructors.is_empty()
            && self.extra_properties.is_empty()
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        match Self::config_path() {
            Some(config_path) => Self::load_from(&config_path).await,
            None => {
                log::info!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if !try_exists(config_path).await? {
            log::info!(
                "Config file does not exist, using defaults: {}",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = match tokio::fs::read_to_string(config_path).await {
            Ok(content) => content,
            Err(io_err) => {
                log::error!("Failed to read config file: {}", io_err);
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            log::warn!("Config file is empty, using defaults");
            Self::backup_broken(config_path).await;
            return Ok(Self::default());
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate()?;
                log::info!("Successfully loaded config from: {}", config_path.display());
                Ok(config)
            }
            Err(json_err) => {
                log::error!("Failed to parse config file: {}", json_err);
                Self::backup_broken(config_path).await;

                // Defaults would silently drop the user's extra blocked names
                if mentions_blocklist(&content) {
                    return Err(anyhow::anyhow!(
                        "ブロックリストの拡張を含む設定ファイルを解析できませんでした: {} - {}",
                        config_path.display(),
                        json_err
                    ));
                }

                Ok(Self::default())
            }
        }
    }

    async fn backup_broken(config_path: &Path) {
        let backup_path = config_path.with_extension("bak");
        if let Err(e) = tokio::fs::copy(config_path, &backup_path).await {
            log::warn!("Failed to backup broken config: {}", e);
        } else {
            log::info!("Backed up broken config to: {}", backup_path.display());
        }
    }

    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("設定ファイルの場所を特定できませんでした"))?;
        self.save_to(&config_path).await?;
        Ok(config_path)
    }

    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        let mut config_to_save = self.clone();
        config_to_save.validate()?;

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "設定ディレクトリの作成に失敗しました: {} - {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("設定のシリアライズに失敗しました: {}", e))?;
        tokio::fs::write(config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "設定ファイルの書き込みに失敗しました: {} - {}",
                config_path.display(),
                e
            )
        })?;

        log::info!("Successfully saved config to: {}", config_path.display());
        Ok(())
    }

    /// Normalize blocklist names: trim, drop empty and duplicate entries.
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        for (label, names) in [
            ("extra_globals", &mut self.blocklist.extra_globals),
            ("extra_constructors", &mut self.blocklist.extra_constructors),
            ("extra_properties", &mut self.blocklist.extra_properties),
        ] {
            let before = names.len();
            let mut seen = std::collections::HashSet::new();
            let cleaned: Vec<String> = names
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty() && seen.insert(name.clone()))
                .collect();

            if cleaned.len() != before || cleaned.iter().zip(names.iter()).any(|(a, b)| a != b) {
                log::warn!("Normalized blocklist entries in {}", label);
                has_issues = true;
            }
            *names = cleaned;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MDXSCRUB_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("MDXSCRUB_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "scriptoris", "mdxscrub")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

fn mentions_blocklist(content: &str) -> bool {
    ["extra_globals", "extra_constructors", "extra_properties"]
        .iter()
        .any(|key| content.contains(key))
}
