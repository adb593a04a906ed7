use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Hosted backend
    pub backend_url: String,
    pub backend_api_key: String,

    // OCR service
    pub ocr_url: String,
    pub ocr_api_key: String,
    pub ocr_language: String,

    // Search
    pub search_language: String,
    pub catalog_db_path: String,

    // Meta
    pub log_level: String,
    pub operator_label: String,

    // Data
    pub voice_corrections: HashMap<String, String>,

    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "https://project.supabase.co".to_string(),
            backend_api_key: "".to_string(),
            ocr_url: "https://api.ocr.space/parse/image".to_string(),
            ocr_api_key: "".to_string(),
            ocr_language: "eng".to_string(),
            search_language: "en-US".to_string(),
            catalog_db_path: dirs::data_dir()
                .unwrap_or_default()
                .join("campusguide/catalog.db")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
            operator_label: "operator".to_string(),
            voice_corrections: HashMap::from([
                ("parasite amol".to_string(), "paracetamol".to_string()),
                ("lagoon".to_string(), "legon".to_string()),
                ("corley boo".to_string(), "korle bu".to_string()),
                ("bar me".to_string(), "balme".to_string()),
            ]),
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from file or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default())
                }
            }
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("campusguide")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search_language, "en-US");
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.voice_corrections.contains_key("lagoon"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.backend_url, restored.backend_url);
        assert_eq!(config.search_language, restored.search_language);
    }

    #[test]
    fn test_config_corrupt_json_handling() {
        // Config::load uses graceful degradation - this tests the parsing path
        let corrupt_json = "{ not valid json";
        let result: Result<Config, _> = serde_json::from_str(corrupt_json);
        assert!(result.is_err());
    }
}
