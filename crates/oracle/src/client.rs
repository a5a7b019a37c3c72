//! OpenAI-compatible chat-completions client.

use hsmap_config::{ResolvedOracleConfig, OracleStatus};
use hsmap_recon::{render_prompt, DisabledOracle, Oracle, OracleError, OracleOption};
use serde::{Deserialize, Serialize};

/// Chat-completions oracle (blocking).
#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OracleClient {
    /// Build a client from resolved configuration. Fails if the config is not
    /// ready or the HTTP client cannot be constructed.
    pub fn new(config: &ResolvedOracleConfig) -> Result<Self, OracleError> {
        if !config.status.is_ready() {
            let reason = config
                .blocking_reason
                .clone()
                .unwrap_or_else(|| config.status.as_str().to_string());
            return Err(OracleError::NotConfigured(reason));
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("hsmap/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Send one prompt and return the reply text, trimmed.
    pub fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut req = self.http.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(map_transport)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().unwrap_or_default();
            return Err(OracleError::Http { status, message });
        }

        let text = response.text().map_err(map_transport)?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| OracleError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(content)
    }
}

impl Oracle for OracleClient {
    fn choose(&self, product: &str, options: &[OracleOption<'_>]) -> Result<String, OracleError> {
        let prompt = render_prompt(product, options);
        log::debug!("oracle prompt for '{}' ({} options)", product, options.len());
        let answer = self.complete(&prompt)?;
        log::debug!("oracle answer for '{}': {}", product, answer);
        Ok(answer)
    }
}

fn map_transport(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Transport(e.to_string())
    }
}

/// Pick the oracle for a resolved configuration: the HTTP client when ready,
/// otherwise a disabled oracle that routes every ambiguous group to fallback.
pub fn oracle_from_config(config: &ResolvedOracleConfig) -> Box<dyn Oracle> {
    match config.status {
        OracleStatus::Ready => match OracleClient::new(config) {
            Ok(client) => Box::new(client),
            Err(e) => {
                log::warn!("oracle unavailable: {}", e);
                Box::new(DisabledOracle { reason: e.to_string() })
            }
        },
        OracleStatus::Disabled | OracleStatus::MissingKey => {
            let reason = config
                .blocking_reason
                .clone()
                .unwrap_or_else(|| config.status.as_str().to_string());
            log::warn!("oracle {}: {}", config.status.as_str(), reason);
            Box::new(DisabledOracle { reason })
        }
    }
}
