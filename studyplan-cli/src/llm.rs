use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use studyplan_core::{GenerationKind, GenerationRequest, TextGenerator};

use crate::config::LlmSection;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
}

impl Provider {
    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => bail!("unknown llm.provider '{other}' (expected gemini, openai, anthropic)"),
        }
    }
}

/// HTTP text generator configured from `[llm]`.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: Provider,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
}

impl LlmClient {
    pub fn from_config(cfg: &LlmSection) -> Result<Self> {
        let provider: Provider = cfg.provider.parse()?;
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("set {} to use the mentor", cfg.api_key_env))?;
        let base_url = if cfg.base_url.trim().is_empty() {
            provider.default_base_url().to_string()
        } else {
            cfg.base_url.trim_end_matches('/').to_string()
        };

        Ok(Self {
            provider,
            model: cfg.model.clone(),
            base_url,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            api_key,
        })
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        tracing::debug!(provider = ?self.provider, model = %self.model, kind = ?request.kind, "llm request");

        match self.provider {
            Provider::Gemini => self.gemini_complete(&client, request).await,
            Provider::OpenAI => self.openai_complete(&client, &request.prompt).await,
            Provider::Anthropic => self.anthropic_complete(&client, &request.prompt).await,
        }
    }

    async fn gemini_complete(&self, client: &reqwest::Client, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = gemini_request(request, self.temperature, self.max_tokens);

        let resp = client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }
        let out: GeminiResponse = resp.json().await.context("parse gemini response")?;
        Ok(out.text())
    }

    async fn openai_complete(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }
        let out: OpenAiResponse = resp.json().await.context("parse openai response")?;
        Ok(out.text())
    }

    async fn anthropic_complete(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }
        let out: AnthropicResponse = resp.json().await.context("parse anthropic response")?;
        Ok(out.text())
    }
}

impl TextGenerator for LlmClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        // Commands run under #[tokio::main]; a nested block_on would panic.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete(request)))
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.complete(request))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "thinkingConfig", skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: u32,
}

/// Structured-data generations skip the thinking phase.
fn gemini_request(request: &GenerationRequest, temperature: f32, max_tokens: u32) -> GeminiRequest {
    let thinking_config = match request.kind {
        GenerationKind::Analysis | GenerationKind::MindMap => Some(GeminiThinkingConfig { thinking_budget: 0 }),
        GenerationKind::Refine | GenerationKind::Chat => None,
    };
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: Some(request.prompt.clone()),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature,
            max_output_tokens: max_tokens,
            thinking_config,
        },
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    fn text(&self) -> String {
        let mut s = String::new();
        if let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) {
            for part in &content.parts {
                if let Some(t) = &part.text {
                    s.push_str(t);
                }
            }
        }
        s.trim().to_string()
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

impl OpenAiResponse {
    fn text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    t: String,
    text: Option<String>,
}

impl AnthropicResponse {
    fn text(&self) -> String {
        let mut s = String::new();
        for b in &self.content {
            if b.t == "text" {
                if let Some(t) = &b.text {
                    s.push_str(t);
                }
            }
        }
        s.trim().to_string()
    }
}
