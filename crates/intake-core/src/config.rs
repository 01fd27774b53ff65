use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IntakeError, Result};

/// Top-level configuration for the intake pipeline.
///
/// Loaded from `intake.toml` by default. Each section corresponds to a
/// component or an external collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub university: UniversityConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

impl IntakeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IntakeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| IntakeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP port for the API server.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            log_level: "info".to_string(),
        }
    }
}

/// University branding used in prompts and progress notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniversityConfig {
    pub name: String,
    pub short_name: String,
}

impl Default for UniversityConfig {
    fn default() -> Self {
        Self {
            name: "North Crest University".to_string(),
            short_name: "NCU".to_string(),
        }
    }
}

/// Conversation memory and session ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Maximum number of recent turns included in the history block.
    pub max_history_turns: usize,
    /// Fixed delay between the user-turn memory write and the engine
    /// invocation, to accommodate eventual-consistency latency.
    pub consistency_delay_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: "./data/intake.db".to_string(),
            max_history_turns: 5,
            consistency_delay_ms: 100,
        }
    }
}

/// Reasoning engine endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the reasoning engine. Empty means no engine is wired and
    /// the composition root falls back to a scripted engine.
    pub base_url: String,
    /// Model identifier forwarded to the engine.
    pub model: String,
}

/// Knowledge-base similarity search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub base_url: String,
    /// Identifier of the knowledge base to query.
    pub knowledge_base_id: String,
    /// Default number of results per query.
    pub default_results: usize,
    /// Minimum relevance score threshold (0.0-1.0).
    pub min_score: f64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            knowledge_base_id: String::new(),
            default_results: 5,
            min_score: 0.5,
        }
    }
}

/// Translation service endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub base_url: String,
}

/// CRM record store credentials and endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
}

impl CrmConfig {
    /// Whether all required credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.security_token.is_empty()
    }
}

/// Outbound messaging gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Queue or webhook URL the gateway accepts dispatch requests on.
    pub queue_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = IntakeConfig::default();
        assert_eq!(config.general.port, 3030);
        assert_eq!(config.memory.max_history_turns, 5);
        assert_eq!(config.memory.consistency_delay_ms, 100);
        assert_eq!(config.knowledge.default_results, 5);
        assert!((config.knowledge.min_score - 0.5).abs() < f64::EPSILON);
        assert!(!config.crm.has_credentials());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\nport = 8080\n\n[university]\nname = \"Mapua University\"\nshort_name = \"MU\"\n"
        )
        .unwrap();
        let config = IntakeConfig::load(file.path()).unwrap();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.university.short_name, "MU");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.memory.max_history_turns, 5);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = IntakeConfig::load_or_default(Path::new("/nonexistent/intake.toml"));
        assert_eq!(config.general.port, 3030);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [").unwrap();
        assert!(IntakeConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.toml");
        let mut config = IntakeConfig::default();
        config.general.port = 4000;
        config.crm.username = "advisor".to_string();
        config.save(&path).unwrap();

        let reloaded = IntakeConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.port, 4000);
        assert_eq!(reloaded.crm.username, "advisor");
    }

    #[test]
    fn test_crm_credentials_check() {
        let crm = CrmConfig {
            base_url: "https://crm.example.com".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            security_token: "t".to_string(),
        };
        assert!(crm.has_credentials());

        let missing_token = CrmConfig {
            security_token: String::new(),
            ..crm
        };
        assert!(!missing_token.has_credentials());
    }
}
