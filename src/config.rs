use crate::errors::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the channels come from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Xtream {
        url: String,
        username: String,
        password: String,
    },
    M3u {
        url: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_player_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_true")]
    pub fullscreen: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
            fullscreen: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub source: SourceConfig,
    /// Rewrite `http://` source URLs to `https://`
    #[serde(default)]
    pub force_https: bool,
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_min_search_len")]
    pub min_search_len: usize,
    /// Terminal columns taken by one tile of the category grid
    #[serde(default = "default_grid_cell_width")]
    pub grid_cell_width: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_playback_timeout_ms")]
    pub playback_timeout_ms: u64,
    #[serde(default)]
    pub player: PlayerConfig,
}

fn default_player_command() -> String {
    "mpv".to_string()
}
fn default_true() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_min_search_len() -> usize {
    2
}
fn default_grid_cell_width() -> u16 {
    28
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_playback_timeout_ms() -> u64 {
    10_000
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("com", "couchiptv", "couch-iptv").ok_or(ConfigError::NoConfigDir)
}

impl AppConfig {
    /// Config with every tunable at its default
    pub fn with_source(source: SourceConfig) -> Self {
        Self {
            source,
            force_https: false,
            search_debounce_ms: default_debounce_ms(),
            min_search_len: default_min_search_len(),
            grid_cell_width: default_grid_cell_width(),
            request_timeout_secs: default_request_timeout_secs(),
            playback_timeout_ms: default_playback_timeout_ms(),
            player: PlayerConfig::default(),
        }
    }

    /// Placeholder written by `--init`
    pub fn template() -> Self {
        Self::with_source(SourceConfig::Xtream {
            url: "http://your-server.example:8080".to_string(),
            username: "your_username".to_string(),
            password: "your_password".to_string(),
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.config_dir().join("config.json"))
    }

    /// Directory for the log file
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let blank = |s: &str| s.trim().is_empty();
        let is_http = |s: &str| {
            let s = s.trim();
            s.starts_with("http://") || s.starts_with("https://")
        };

        match &self.source {
            SourceConfig::Xtream {
                url,
                username,
                password,
            } => {
                if blank(url) || blank(username) || blank(password) {
                    return Err(ConfigError::Incomplete(
                        "xtream source needs url, username and password",
                    ));
                }
                if !is_http(url) {
                    return Err(ConfigError::Incomplete("xtream url must start with http:// or https://"));
                }
            }
            SourceConfig::M3u { url } => {
                if blank(url) {
                    return Err(ConfigError::Incomplete("m3u source needs a playlist url"));
                }
                if !is_http(url) {
                    return Err(ConfigError::Incomplete("m3u url must start with http:// or https://"));
                }
            }
        }

        if self.min_search_len == 0 {
            return Err(ConfigError::Incomplete("min_search_len must be at least 1"));
        }
        if self.grid_cell_width == 0 {
            return Err(ConfigError::Incomplete("grid_cell_width must be at least 1"));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn playback_timeout(&self) -> Duration {
        Duration::from_millis(self.playback_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = AppConfig::from_json(
            r#"{"source": {"type": "m3u", "url": "http://lists.example/tv.m3u"}}"#,
        )
        .unwrap();
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.min_search_len, 2);
        assert_eq!(config.player.command, "mpv");
        assert!(config.player.fullscreen);
        assert!(!config.force_https);
    }

    #[test]
    fn test_incomplete_xtream_rejected() {
        let err = AppConfig::from_json(
            r#"{"source": {"type": "xtream", "url": "http://p.example", "username": "", "password": "x"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Incomplete(_)));
    }

    #[test]
    fn test_url_scheme_required() {
        let config = AppConfig::with_source(SourceConfig::M3u {
            url: "lists.example/tv.m3u".to_string(),
        });
        assert!(matches!(config.validate(), Err(ConfigError::Incomplete(_))));
    }

    #[test]
    fn test_unknown_source_type_is_parse_error() {
        let err = AppConfig::from_json(r#"{"source": {"type": "stalker", "url": "http://x"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("couch-iptv-missing-config.json");
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir()
            .join(format!("couch-iptv-test-{}", std::process::id()))
            .join("config.json");
        let config = AppConfig::template();
        config.save(&path).unwrap();
        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
