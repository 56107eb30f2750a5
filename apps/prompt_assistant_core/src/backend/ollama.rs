//! Ollama 本地生成接口

use log::{error, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, trim_base_url, Backend};
use crate::{
    config::OllamaConfig,
    error::{Error, Result},
};

const BACKEND_NAME: &str = "ollama";

/// Ollama 生成请求
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Ollama 生成响应
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

/// Ollama 后端
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    host: String,
    model: String,
    client: Client,
}

impl OllamaBackend {
    pub fn new(host: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "ollama_host".to_string(),
            });
        }
        if model.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "model".to_string(),
            });
        }

        Ok(Self {
            host: trim_base_url(host),
            model: model.to_string(),
            client: http_client(timeout_secs)?,
        })
    }

    /// 使用配置文件中的地址与超时
    pub fn from_config(config: &OllamaConfig, model: &str) -> Result<Self> {
        Self::new(&config.ollama_host, model, config.timeout_secs)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 获取本地已安装的模型列表
    pub fn list_models(host: &str, timeout_secs: u64) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", trim_base_url(host));
        let response = http_client(timeout_secs)?.get(&url).send()?;
        let response = check_status(BACKEND_NAME, response)?;

        let tags: TagsResponse = response.json().map_err(|e| Error::InvalidResponse {
            backend: BACKEND_NAME.to_string(),
            message: e.to_string(),
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

impl Backend for OllamaBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        info!("ollama request: {url}, model: {}", self.model);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| {
                error!("ollama request failed, {e}");
                Error::Transport(e)
            })?;
        let response = check_status(BACKEND_NAME, response).inspect_err(|e| {
            error!("{e}");
        })?;

        let data: GenerateResponse = response.json().map_err(|e| {
            error!("ollama response parse failed, {e}");
            Error::InvalidResponse {
                backend: BACKEND_NAME.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(data.response.trim().to_string())
    }
}
