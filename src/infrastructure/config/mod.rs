use crate::domain::chart::ChartKind;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::locale::Language;
use crate::domain::profile::ProfileConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_CONFIG_FILE: &str = "sheetsense.toml";
pub const ENV_PREFIX: &str = "SHEETSENSE_";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadConfig {
    #[validate(length(min = 1))]
    pub allowed_extensions: Vec<String>,
    /// Bytes (default: 10 MiB)
    #[validate(range(min = 1))]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".xlsx".to_string(), ".xls".to_string()],
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatConfig {
    /// Characters (default: 500)
    #[validate(range(min = 1))]
    pub max_query_length: usize,
    /// Rows included in the user message (default: 5)
    pub sample_rows: usize,
    /// Overrides the language's marker token.
    #[validate(length(min = 1))]
    pub marker: Option<String>,
    /// Words in a reply that call for a chart. Empty means the language's
    /// defaults; the marker always counts.
    pub chart_triggers: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_query_length: 500,
            sample_rows: 5,
            marker: None,
            chart_triggers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRuleConfig {
    pub kind: ChartKind,
    pub keywords: Vec<String>,
}

/// Replaces the language's keyword sets when non-empty. Order is priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    pub keywords: Vec<KeywordRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryConfig {
    /// Uploads kept per session
    #[validate(range(min = 1))]
    pub max_entries: usize,
    /// Live sessions; the least recently used one is dropped past this
    #[validate(range(min = 1))]
    pub max_sessions: usize,
    /// Idle seconds before a session expires (default: 1 hour)
    #[validate(range(min = 1))]
    pub session_ttl_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_sessions: 100,
            session_ttl_secs: 3600,
        }
    }
}

impl HistoryConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub language: Language,
    pub log_level: String,
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub chat: ChatConfig,
    pub llm: LLMConfig,
    pub profile: ProfileConfig,
    pub charts: ChartConfig,
    pub history: HistoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            upload: UploadConfig::default(),
            chat: ChatConfig::default(),
            llm: LLMConfig::default(),
            profile: ProfileConfig::default(),
            charts: ChartConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then layers defaults, the TOML file named by
    /// `SHEETSENSE_CONFIG` (or `sheetsense.toml`) and `SHEETSENSE_*` variables.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path =
            std::env::var("SHEETSENSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_path(&path)
    }

    /// `OPENAI_API_KEY` fills the LLM key when nothing else sets it.
    pub fn from_path(path: &str) -> Result<Self> {
        let mut config: AppConfig = Self::figment(path).extract()?;
        if config.llm.api_key.is_none() {
            config.llm.api_key = Figment::from(Env::raw().only(&["OPENAI_API_KEY"]))
                .extract_inner::<String>("openai_api_key")
                .ok();
        }
        config.validate()?;
        Ok(config)
    }

    /// Nested keys use `__`, e.g. `SHEETSENSE_LLM__MODEL`.
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |e: validator::ValidationErrors| AppError::ConfigError(e.to_string());

        self.server.validate().map_err(invalid)?;
        self.upload.validate().map_err(invalid)?;
        self.chat.validate().map_err(invalid)?;
        self.history.validate().map_err(invalid)?;
        self.profile.validate().map_err(AppError::ConfigError)?;

        if self.llm.timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "llm.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.chat.chart_triggers.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::ConfigError(
                "chat.chart_triggers must not contain empty words".to_string(),
            ));
        }
        if self
            .charts
            .keywords
            .iter()
            .any(|rule| rule.keywords.iter().any(|k| k.trim().is_empty()))
        {
            return Err(AppError::ConfigError(
                "charts.keywords must not contain empty keywords".to_string(),
            ));
        }
        Ok(())
    }

    /// Marker token the assistant is told to include when a chart would help.
    pub fn marker(&self) -> String {
        self.chat
            .marker
            .clone()
            .unwrap_or_else(|| self.language.marker().to_string())
    }

    /// Reply words that turn on chart selection, marker included.
    pub fn chart_triggers(&self) -> Vec<String> {
        let mut triggers: Vec<String> = if self.chat.chart_triggers.is_empty() {
            self.language
                .default_chart_triggers()
                .iter()
                .map(|t| t.to_string())
                .collect()
        } else {
            self.chat.chart_triggers.clone()
        };

        let marker = self.marker();
        if !triggers.contains(&marker) {
            triggers.insert(0, marker);
        }
        triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::LLMProvider;
    use figment::Jail;

    #[test]
    fn defaults_match_upload_and_chat_limits() {
        let config = AppConfig::default();

        assert_eq!(config.language, Language::Azerbaijani);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.upload.allowed_extensions, vec![".xlsx", ".xls"]);
        assert_eq!(config.chat.max_query_length, 500);
        assert_eq!(config.chat.sample_rows, 5);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, Some(500));
        assert_eq!(config.profile.categorical_ratio, 0.5);
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(config.history.max_sessions, 100);
        assert_eq!(config.history.session_ttl(), Duration::from_secs(3600));
        assert_eq!(config.marker(), "vizualizasiya");
        assert_eq!(
            config.chart_triggers(),
            vec![
                "vizualizasiya",
                "qrafik",
                "diaqram",
                "histoqram",
                "pasta",
                "xətti",
                "sütun"
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_then_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sheetsense.toml",
                r#"
                    language = "en"

                    [chat]
                    max_query_length = 300

                    [llm]
                    provider = "OpenRouter"
                    model = "from-file"
                "#,
            )?;
            jail.set_env("SHEETSENSE_LLM__MODEL", "from-env");
            jail.set_env("SHEETSENSE_SERVER__PORT", "8080");

            let config = AppConfig::from_path("sheetsense.toml").expect("config loads");

            assert_eq!(config.language, Language::English);
            assert_eq!(config.chat.max_query_length, 300);
            assert_eq!(config.chat.sample_rows, 5);
            assert_eq!(config.llm.provider, LLMProvider::OpenRouter);
            assert_eq!(config.llm.model, "from-env");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.marker(), "visualization");
            assert!(config.chart_triggers().contains(&"chart".to_string()));
            Ok(())
        });
    }

    #[test]
    fn configured_triggers_replace_defaults_but_keep_marker() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sheetsense.toml",
                r#"
                    [chat]
                    marker = "plot"
                    chart_triggers = ["graph", "figure"]

                    [history]
                    max_sessions = 5
                    session_ttl_secs = 60
                "#,
            )?;

            let config = AppConfig::from_path("sheetsense.toml").expect("config loads");

            assert_eq!(config.chart_triggers(), vec!["plot", "graph", "figure"]);
            assert_eq!(config.history.max_sessions, 5);
            assert_eq!(config.history.session_ttl(), Duration::from_secs(60));
            assert_eq!(config.history.max_entries, 100);
            Ok(())
        });
    }

    #[test]
    fn openai_key_is_a_fallback() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-fallback");
            let config = AppConfig::from_path("missing.toml").expect("config loads");
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-fallback"));

            jail.set_env("SHEETSENSE_LLM__API_KEY", "sk-explicit");
            let config = AppConfig::from_path("missing.toml").expect("config loads");
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-explicit"));
            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = AppConfig::default();
        config.chat.max_query_length = 0;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.history.max_sessions = 0;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.chat.chart_triggers = vec!["chart".to_string(), " ".to_string()];
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.profile.categorical_ratio = 1.5;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.charts.keywords = vec![KeywordRuleConfig {
            kind: ChartKind::Pie,
            keywords: vec!["  ".to_string()],
        }];
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
    }
}
