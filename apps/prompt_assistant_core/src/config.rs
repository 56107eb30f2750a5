//! 后端配置
//!
//! 对应插件目录下的 `api_config.json` 与 `ollama_config.json`

use std::{fs, path::Path};

use log::error;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

/// API 配置文件名
pub const API_CONFIG_FILE: &str = "api_config.json";
/// Ollama 配置文件名
pub const OLLAMA_CONFIG_FILE: &str = "ollama_config.json";

/// 请求超时 (秒)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// 本地 Ollama 默认地址
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
/// 模型列表获取失败时的默认模型
pub const DEFAULT_MODEL: &str = "llama2";

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_temperature() -> f32 {
    0.7
}

fn default_api_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// 读取 JSON 配置文件
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        error!("failed to read config file {}: {e}", path.display());
        Error::Config {
            message: format!("{}: {e}", path.display()),
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        error!("invalid config file {}: {e}", path.display());
        Error::Config {
            message: format!("{}: {e}", path.display()),
        }
    })
}

/// OpenAI 兼容接口配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// 必填, 为空时构建后端失败
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_model")]
    pub api_model: String,
    #[serde(default = "default_api_temperature")]
    pub api_temperature: f32,
    #[serde(default = "default_api_max_tokens")]
    pub api_max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 相对插件目录
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: default_api_base(),
            api_model: default_api_model(),
            api_temperature: default_api_temperature(),
            api_max_tokens: default_api_max_tokens(),
            timeout_secs: default_timeout_secs(),
            template_dir: default_template_dir(),
        }
    }

    /// 从文件加载并校验
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// 校验必填字段
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "api_key".to_string(),
            });
        }
        if self.api_base.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "api_base".to_string(),
            });
        }
        if self.api_model.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "api_model".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_api_model(mut self, api_model: impl Into<String>) -> Self {
        self.api_model = api_model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.api_temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.api_max_tokens = max_tokens;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Ollama 配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OllamaConfig {
    pub ollama_host: String,
    /// 相对插件目录
    pub template_dir: String,
    /// 模型列表获取失败时使用
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl OllamaConfig {
    pub fn new(ollama_host: impl Into<String>) -> Self {
        Self {
            ollama_host: ollama_host.into(),
            template_dir: default_template_dir(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// 从文件加载并校验
    ///
    /// `ollama_host` 与 `template_dir` 缺失时 serde 直接报错
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ollama_host.trim().is_empty() {
            return Err(Error::ConfigMissingField {
                field: "ollama_host".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_template_dir(mut self, template_dir: impl Into<String>) -> Self {
        self.template_dir = template_dir.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
