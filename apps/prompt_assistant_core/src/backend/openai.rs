//! OpenAI 兼容的对话接口

use log::{error, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, trim_base_url, Backend};
use crate::{
    config::ApiConfig,
    error::{Error, Result},
};

const BACKEND_NAME: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 兼容后端
///
/// 构建时校验 `api_key`, 密钥为空时不会发出任何请求
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl OpenAiBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            api_base: trim_base_url(&config.api_base),
            api_key: config.api_key.trim().to_string(),
            model: config.api_model.clone(),
            temperature: config.api_temperature,
            max_tokens: config.api_max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Backend for OpenAiBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        info!("api request: {}, model: {}", self.api_base, self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                error!("api request failed, {e}");
                Error::Transport(e)
            })?;
        let response = check_status(BACKEND_NAME, response).inspect_err(|e| {
            error!("{e}");
        })?;

        let data: ChatResponse = response.json().map_err(|e| {
            error!("api response parse failed, {e}");
            Error::InvalidResponse {
                backend: BACKEND_NAME.to_string(),
                message: e.to_string(),
            }
        })?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse {
                backend: BACKEND_NAME.to_string(),
                message: "no completion choices".to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}
