// Oracle configuration and secrets management
//
// API keys are looked up in:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;
use std::time::Duration;

use crate::settings::{OracleProvider, OracleSettings};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "hsmap";

/// Ollama ignores the bearer token but the OpenAI wire format wants one.
const LOCAL_PLACEHOLDER_KEY: &str = "ollama";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
    /// Placeholder key for a local backend
    Placeholder,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::Placeholder => "placeholder",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

fn env_var_name(provider: &str) -> String {
    format!("HSMAP_{}_KEY", provider.to_uppercase())
}

fn keychain_account(provider: &str) -> String {
    format!("oracle/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (HSMAP_OPENAI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved oracle configuration
// ============================================================================

/// Status of the oracle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleStatus {
    /// provider = none
    Disabled,
    Ready,
    /// Provider needs a key and none was found
    MissingKey,
}

impl OracleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Command-line overrides applied on top of settings.
#[derive(Debug, Clone, Default)]
pub struct OracleOverrides {
    pub provider: Option<OracleProvider>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// The effective oracle configuration. Built once and handed to the client.
#[derive(Debug, Clone)]
pub struct ResolvedOracleConfig {
    pub provider: OracleProvider,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: OracleStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedOracleConfig {
    pub fn from_settings(settings: &OracleSettings) -> Self {
        Self::resolve(settings, get_api_key)
    }

    pub fn with_overrides(settings: &OracleSettings, overrides: &OracleOverrides) -> Self {
        let mut effective = settings.clone();
        if let Some(provider) = overrides.provider {
            effective.provider = provider;
        }
        if let Some(ref endpoint) = overrides.endpoint {
            effective.endpoint = Some(endpoint.clone());
        }
        if let Some(ref model) = overrides.model {
            effective.model = model.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            effective.timeout_secs = secs;
        }
        Self::from_settings(&effective)
    }

    fn resolve(settings: &OracleSettings, lookup: impl Fn(&str) -> KeyLookup) -> Self {
        let provider = settings.provider;
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                endpoint: String::new(),
                timeout,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
                api_key: None,
                key_source: KeySource::None,
                status: OracleStatus::Disabled,
                blocking_reason: Some("provider=none".to_string()),
            };
        }

        let (api_key, key_source, status, blocking_reason) = if provider.needs_api_key() {
            let found = lookup(provider.name());
            match found.key {
                Some(key) => (Some(key), found.source, OracleStatus::Ready, None),
                None => (
                    None,
                    KeySource::None,
                    OracleStatus::MissingKey,
                    Some(format!(
                        "No API key found. Set via keychain or {}",
                        env_var_name(provider.name())
                    )),
                ),
            }
        } else {
            (
                Some(LOCAL_PLACEHOLDER_KEY.to_string()),
                KeySource::Placeholder,
                OracleStatus::Ready,
                None,
            )
        };

        Self {
            provider,
            model: settings.effective_model().to_string(),
            endpoint: settings.effective_endpoint().trim_end_matches('/').to_string(),
            timeout,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key,
            key_source,
            status,
            blocking_reason,
        }
    }

    /// Load settings and resolve in one call
    pub fn load() -> Self {
        let settings = crate::settings::Settings::load();
        Self::from_settings(&settings.oracle)
    }
}

// ============================================================================
// Diagnostics (for `hsmap oracle doctor`)
// ============================================================================

#[derive(Debug, serde::Serialize)]
pub struct OracleDiagnostics {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub status: String,
    pub timeout_secs: u64,
    pub key_present: bool,
    pub key_source: String,
    pub keychain_available: bool,
    pub settings_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_reason: Option<String>,
}

impl OracleDiagnostics {
    pub fn from_resolved(config: &ResolvedOracleConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            status: config.status.as_str().to_string(),
            timeout_secs: config.timeout.as_secs(),
            key_present: config.api_key.is_some(),
            key_source: config.key_source.as_str().to_string(),
            keychain_available: keychain_available(),
            settings_path: crate::settings::Settings::config_path_display(),
            blocking_reason: config.blocking_reason.clone(),
        }
    }
}

impl std::fmt::Display for OracleDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Oracle Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status)?;
        writeln!(f, "Model:             {}", self.model)?;
        writeln!(f, "Endpoint:          {}", self.endpoint)?;
        writeln!(f, "Timeout:           {}s", self.timeout_secs)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source)?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        writeln!(f, "Settings file:     {}", self.settings_path)?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocking reason:   {}", reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_key(_: &str) -> KeyLookup {
        KeyLookup { key: None, source: KeySource::None }
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("openai"), "HSMAP_OPENAI_KEY");
        assert_eq!(env_var_name("OpenAI"), "HSMAP_OPENAI_KEY");
    }

    #[test]
    fn test_keychain_account() {
        assert_eq!(keychain_account("OpenAI"), "oracle/openai");
    }

    #[test]
    fn test_key_lookup_from_env() {
        env::set_var("HSMAP_TESTPROVIDER_KEY", "test-key-123");

        let lookup = get_api_key("testprovider");
        assert_eq!(lookup.key, Some("test-key-123".to_string()));

        env::remove_var("HSMAP_TESTPROVIDER_KEY");
    }

    #[test]
    fn local_provider_uses_placeholder_key() {
        let config = ResolvedOracleConfig::resolve(&OracleSettings::default(), no_key);
        assert_eq!(config.status, OracleStatus::Ready);
        assert_eq!(config.api_key.as_deref(), Some("ollama"));
        assert_eq!(config.key_source, KeySource::Placeholder);
        assert_eq!(config.endpoint, "http://localhost:11434/v1");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn openai_without_key_is_missing_key() {
        let settings = OracleSettings {
            provider: OracleProvider::OpenAI,
            ..Default::default()
        };
        let config = ResolvedOracleConfig::resolve(&settings, no_key);
        assert_eq!(config.status, OracleStatus::MissingKey);
        assert!(config.blocking_reason.unwrap().contains("HSMAP_OPENAI_KEY"));
    }

    #[test]
    fn openai_with_key_is_ready() {
        let settings = OracleSettings {
            provider: OracleProvider::OpenAI,
            ..Default::default()
        };
        let config = ResolvedOracleConfig::resolve(&settings, |_| KeyLookup {
            key: Some("sk-test".into()),
            source: KeySource::Environment,
        });
        assert!(config.status.is_ready());
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn disabled_provider() {
        let settings = OracleSettings {
            provider: OracleProvider::None,
            ..Default::default()
        };
        let config = ResolvedOracleConfig::resolve(&settings, no_key);
        assert_eq!(config.status, OracleStatus::Disabled);
    }

    #[test]
    fn overrides_win_and_trailing_slash_is_trimmed() {
        let overrides = OracleOverrides {
            endpoint: Some("http://gpu-box:11434/v1/".into()),
            model: Some("qwen2.5:7b".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = ResolvedOracleConfig::with_overrides(&OracleSettings::default(), &overrides);
        assert_eq!(config.endpoint, "http://gpu-box:11434/v1");
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
