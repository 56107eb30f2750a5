//! Prompt Assistant Core
//!
//! 提示词优化、翻译与 CLIP 标签生成, 支持本地 Ollama 与 OpenAI 兼容接口

pub mod backend;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tagger;
pub mod template;

pub use backend::{Backend, OllamaBackend, OpenAiBackend};
pub use config::{ApiConfig, OllamaConfig};
pub use error::{Error, Result};
pub use pipeline::{
    Enhancement, FailurePolicy, PipelineOptions, PipelineResult, PromptPipeline, TagSource,
};
pub use template::TemplateStore;
