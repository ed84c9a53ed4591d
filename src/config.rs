use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// "auto" — взять дисплей из $DISPLAY, иначе явное имя вида ":0"
    pub name: String,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "wintrack=info".to_string(),
            },
            display: DisplayConfig {
                name: "auto".to_string(),
                poll_interval_ms: 50,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("WINTRACK_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Имя дисплея для x11rb::connect: None означает "из окружения"
    pub fn display_name(&self) -> Option<&str> {
        if self.display.name == "auto" {
            None
        } else {
            Some(self.display.name.as_str())
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек дисплея
        if self.display.name != "auto" && !self.display.name.starts_with(':') {
            anyhow::bail!(
                "Неверное имя дисплея: {} (ожидается \"auto\" или \":N\")",
                self.display.name
            );
        }

        if self.display.poll_interval_ms < 10 {
            anyhow::bail!("poll_interval_ms должно быть минимум 10");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_display_name_auto() {
        let config = Config::default();
        assert_eq!(config.display_name(), None);

        let mut config = Config::default();
        config.display.name = ":1".to_string();
        assert_eq!(config.display_name(), Some(":1"));
    }

    #[test]
    fn test_invalid_display_name_rejected() {
        let mut config = Config::default();
        config.display.name = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_lower_bound() {
        let mut config = Config::default();
        config.display.poll_interval_ms = 5;
        assert!(config.validate().is_err());

        config.display.poll_interval_ms = 10;
        assert!(config.validate().is_ok());
    }
}
