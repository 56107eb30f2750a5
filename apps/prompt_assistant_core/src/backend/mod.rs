//! LLM 后端
//!
//! 本地 Ollama 生成接口与远程 OpenAI 兼容对话接口, 统一为 [`Backend`]

mod ollama;
mod openai;

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::error::{Error, Result};

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// 文本生成后端
pub trait Backend: Send + Sync {
    /// 后端名称, 用于日志与错误信息
    fn name(&self) -> &str;

    /// 发送单条提示词, 返回模型的原始回复
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// 创建带超时的 HTTP 客户端
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// 非成功状态码转换为后端错误
pub(crate) fn check_status(backend: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(Error::BackendStatus {
        backend: backend.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// 去掉地址末尾的 `/`
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
