use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "coinverter";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_refresh")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_coin_limit")]
    pub coin_limit: u32,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub coingecko_api_key: String,
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_refresh() -> u64 {
    60
}

fn default_coin_limit() -> u32 {
    100
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            refresh_interval_secs: default_refresh(),
            coin_limit: default_coin_limit(),
            ai_model: default_ai_model(),
            log_level: default_log_level(),
            coingecko_api_key: String::new(),
        }
    }
}

impl Config {
    /// Loads `path` (or the default location), writing defaults when the file
    /// does not exist yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let cfg: Config = serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            Ok(cfg.normalized())
        } else {
            let cfg = Config::default();
            cfg.save(&path)?;
            Ok(cfg)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.refresh_interval_secs = self.refresh_interval_secs.max(30);
        self.coin_limit = self.coin_limit.clamp(1, 250);
        self
    }

    pub fn config_path() -> PathBuf {
        Self::app_dir().join("config.yaml")
    }

    pub fn log_path() -> PathBuf {
        Self::app_dir().join("coinverter.log")
    }

    fn app_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

/// Gemini credential, read once at startup.
pub fn gemini_api_key() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_yaml::from_str("theme: light\n").unwrap();
        assert_eq!(cfg.theme, "light");
        assert_eq!(cfg.coin_limit, 100);
        assert_eq!(cfg.ai_model, "gemini-2.5-flash");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg: Config =
            serde_yaml::from_str("refresh_interval_secs: 5\ncoin_limit: 1000\n").unwrap();
        let cfg = cfg.normalized();
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.coin_limit, 250);
    }

    #[test]
    fn load_writes_defaults_then_reads_them_back() {
        let dir = std::env::temp_dir().join(format!("coinverter-cfg-{}", std::process::id()));
        let path = dir.join("config.yaml");
        let _ = fs::remove_dir_all(&dir);

        let first = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(first, Config::default());

        let again = Config::load(Some(&path)).unwrap();
        assert_eq!(again, first);
        let _ = fs::remove_dir_all(&dir);
    }
}
