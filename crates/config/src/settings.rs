// Oracle settings
// Loaded from ~/.config/hsmap/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Oracle backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    /// No oracle; every ambiguous group takes the fallback path
    None,
    /// Local model via Ollama's OpenAI-compatible endpoint (default)
    #[default]
    Local,
    /// OpenAI API
    #[serde(rename = "openai")]
    OpenAI,
}

impl OracleProvider {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, OracleProvider::None)
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, OracleProvider::OpenAI)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OracleProvider::None => "none",
            OracleProvider::Local => "local",
            OracleProvider::OpenAI => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            OracleProvider::None => "",
            OracleProvider::Local => "deepseek-r1:1.5b",
            OracleProvider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            OracleProvider::None => "",
            OracleProvider::Local => "http://localhost:11434/v1",
            OracleProvider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub provider: OracleProvider,

    /// Model identifier; empty = provider default
    pub model: String,

    /// Base URL of the chat-completions API; None = provider default
    pub endpoint: Option<String>,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            provider: OracleProvider::Local,
            model: String::new(),
            endpoint: None,
            timeout_secs: 60,
            temperature: 0.1,
            max_tokens: 500,
        }
    }
}

impl OracleSettings {
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub oracle: OracleSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hsmap");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {}; using defaults", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Disambiguation oracle
    // Provider options: "none", "local" (Ollama), "openai"
    // API keys are read from the system keychain or HSMAP_<PROVIDER>_KEY, not this file
    "oracle": {
        "provider": "local",
        "model": "",
        "endpoint": null,
        "timeout_secs": 60,
        "temperature": 0.1,
        "max_tokens": 500
    }
}
"#;

        if let Err(e) = fs::write(&path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
