use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::ui::theme::ThemeName;

pub const DEFAULT_MEDIA_URL: &str =
    "https://sample-videos.com/video123/mp4/240/big_buck_bunny_240p_30mb.mp4";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub media_url: String,
    pub poll_interval_ms: u64,
    pub auto_hide_delay_ms: u64,
    pub seek_step_secs: f64,
    pub theme: ThemeName,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_url: DEFAULT_MEDIA_URL.to_string(),
            poll_interval_ms: 100,
            auto_hide_delay_ms: 1000,
            seek_step_secs: 5.0,
            theme: ThemeName::default(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.auto_hide_delay_ms)
    }

    /// Falls back to 5 s for values that are not a positive, representable duration.
    pub fn seek_step(&self) -> Duration {
        Duration::try_from_secs_f64(self.seek_step_secs)
            .ok()
            .filter(|step| !step.is_zero())
            .unwrap_or(Duration::from_secs(5))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse config file")
    }
}

fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join("reelplay");

    Ok(config_dir.join("config.yml"))
}

pub fn load_or_create_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = Config::default();
        let yaml =
            serde_yaml::to_string(&default_config).context("Failed to serialize default config")?;

        fs::write(&config_path, yaml).context("Failed to write default config file")?;
        log::info!("Config file created at: {}", config_path.display());

        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path).context("Failed to read config file")?;
    let config = Config::from_yaml(&config_content)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

    log::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.media_url, DEFAULT_MEDIA_URL);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.auto_hide_delay(), Duration::from_secs(1));
        assert_eq!(config.seek_step(), Duration::from_secs(5));
        assert_eq!(config.theme, ThemeName::CatppuccinMocha);
    }

    #[test]
    fn test_partial_yaml_takes_defaults() {
        let config = Config::from_yaml("media_url: https://example.com/a.mp4\n").unwrap();
        assert_eq!(config.media_url, "https://example.com/a.mp4");
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.auto_hide_delay_ms, 1000);
    }

    #[test]
    fn test_theme_parses_snake_case() {
        let config = Config::from_yaml("theme: tokyo_night\n").unwrap();
        assert_eq!(config.theme, ThemeName::TokyoNight);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let config = Config::from_yaml("poll_interval_ms: 0\nseek_step_secs: -2\n").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
        assert_eq!(config.seek_step(), Duration::from_secs(5));
    }

    #[test]
    fn test_oversized_seek_step_falls_back() {
        let config = Config::from_yaml("seek_step_secs: 1e20\n").unwrap();
        assert_eq!(config.seek_step(), Duration::from_secs(5));

        let config = Config::from_yaml("seek_step_secs: 1.8e19\n").unwrap();
        assert_eq!(config.seek_step(), Duration::from_secs_f64(1.8e19));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.poll_interval_ms = 250;
        config.theme = ThemeName::TokyoNight;

        let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");
        let parsed = Config::from_yaml(&yaml).expect("Failed to parse config");

        assert_eq!(parsed.poll_interval_ms, 250);
        assert_eq!(parsed.theme, ThemeName::TokyoNight);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(Config::from_yaml("poll_interval_ms: fast\n").is_err());
    }
}
