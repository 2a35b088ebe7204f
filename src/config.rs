//! Application configuration module / Модуль конфигурации
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / Создаёт файл по умолчанию при первом запуске

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration / Конфигурация приложения
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / Сервер
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog database files / Файлы баз каталогов
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Glossary facet allow-lists / Допустимые игры глоссария
    #[serde(default)]
    pub glossary: GlossaryConfig,
}

/// Server configuration / Конфигурация сервера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / Адрес
    pub host: String,
    /// Server port / Порт
    pub port: u16,
    /// Allowed CORS origins, empty means any / Разрешённые источники CORS
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration / Конфигурация баз данных
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path / Каталог с базами
    pub data_dir: String,
    /// TES glossary file (relative to data_dir)
    pub glossary_tes: String,
    /// Fallout glossary file (relative to data_dir)
    pub glossary_fallout: String,
    /// Library file (relative to data_dir)
    pub library: String,
    /// Item catalog file (relative to data_dir)
    pub atx: String,
}

/// Glossary configuration / Конфигурация глоссария
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryConfig {
    pub tes_games: Vec<String>,
    pub fallout_games: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://rueso.ru".to_string(),
                "https://rueso.ru".to_string(),
                "http://127.0.0.1".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "db".to_string(),
            glossary_tes: "glossary.db".to_string(),
            glossary_fallout: "glossary_fallout.db".to_string(),
            library: "library.db".to_string(),
            atx: "f76_atx.db".to_string(),
        }
    }
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        let to_vec = |games: &[&str]| -> Vec<String> { games.iter().map(|g| g.to_string()).collect() };
        Self {
            tes_games: to_vec(&[
                "eso", "skyrim", "oblivion", "morrowind", "legends", "blades", "castles",
                "redguard", "battlespire", "travels", "arena", "daggerfall",
            ]),
            fallout_games: to_vec(&[
                "fallout1", "fallout2", "tactics", "fallout3", "newvegas", "fallout4",
                "fallout76", "shelter",
            ]),
        }
    }
}

impl AppConfig {
    /// Get the full data directory path / Каталог данных
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    pub fn get_glossary_tes_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.database.glossary_tes)
    }

    pub fn get_glossary_fallout_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.database.glossary_fallout)
    }

    pub fn get_library_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.database.library)
    }

    pub fn get_atx_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.database.atx)
    }

    /// Get the server bind address / Адрес для прослушивания
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides / Переопределения из окружения
    pub fn apply_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("DATABASE_DIR") {
            if !dir.trim().is_empty() {
                self.database.data_dir = dir;
            }
        }
        self
    }
}

/// Get the config file path / Путь к файлу конфигурации
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / Загрузить или создать конфигурацию
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / Загрузить существующую
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / Создать по умолчанию
        let config = AppConfig::default();
        save_config(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / Сохранить конфигурацию
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_created_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let created = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.server.port, 8000);

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.glossary.tes_games, created.glossary.tes_games);
        assert_eq!(reloaded.get_atx_path(), PathBuf::from("db").join("f76_atx.db"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"host": "127.0.0.1", "port": 9000}}"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.get_bind_address(), "127.0.0.1:9000");
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.database.library, "library.db");
        assert!(config.glossary.tes_games.contains(&"skyrim".to_string()));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
