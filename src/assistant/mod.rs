//! LLM 提示词助手节点
//!
//! 三个节点共用同一条流水线, 区别只在后端与配置来源:
//! - LLMPromptAssistant: 节点上填写 Ollama 地址
//! - OllamaPromptAssistant: 读取 ollama_config.json
//! - APIPromptAssistant: 读取 api_config.json, 调用 OpenAI 兼容接口

use log::warn;
use prompt_assistant_core::{
    Backend, OllamaBackend, PipelineOptions, PromptPipeline, TemplateStore,
};
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::{core::node::NodeRegister, error::Error};

mod llm_prompt_assistant;
pub use llm_prompt_assistant::LLMPromptAssistant;

mod ollama_prompt_assistant;
pub use ollama_prompt_assistant::OllamaPromptAssistant;

mod api_prompt_assistant;
pub use api_prompt_assistant::APIPromptAssistant;

/// 获取模型列表的超时 (秒), 节点加载时调用, 不宜过长
const MODEL_LIST_TIMEOUT_SECS: u64 = 5;

/// 节点输出名称
const RETURN_NAMES: (&str, &str, &str) = ("preview_prompt", "output_prompt", "tagger_prompt");

/// 模型下拉选项, 服务不可用时返回默认模型
fn model_choices(py: Python<'_>, host: &str, default_model: &str) -> Vec<String> {
    let models = py.allow_threads(|| OllamaBackend::list_models(host, MODEL_LIST_TIMEOUT_SECS));
    match models {
        Ok(v) if !v.is_empty() => v,
        Ok(_) => vec![default_model.to_string()],
        Err(e) => {
            warn!("failed to list ollama models from {host}, {e}");
            vec![default_model.to_string()]
        }
    }
}

/// 运行流水线, 期间释放 GIL
fn run_pipeline(
    py: Python<'_>,
    backend: &dyn Backend,
    templates: &TemplateStore,
    options: PipelineOptions,
    text: &str,
    enable_enhancement: bool,
) -> Result<(String, String, String), Error> {
    let result = py.allow_threads(|| {
        PromptPipeline::new(backend, templates)
            .with_options(options)
            .process(text, enable_enhancement)
    })?;
    Ok(result.into_tuple())
}

/// LLM 助手模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "assistant")?;
    submodule.add_class::<LLMPromptAssistant>()?;
    submodule.add_class::<OllamaPromptAssistant>()?;
    submodule.add_class::<APIPromptAssistant>()?;
    Ok(submodule)
}

/// LLM assistant node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![
        NodeRegister(
            "LLMPromptAssistant",
            py.get_type::<LLMPromptAssistant>(),
            "LLM提示词助手（Ollama）",
        ),
        NodeRegister(
            "OllamaPromptAssistant",
            py.get_type::<OllamaPromptAssistant>(),
            "LLM提示词助手（Ollama 配置）",
        ),
        NodeRegister(
            "APIPromptAssistant",
            py.get_type::<APIPromptAssistant>(),
            "LLM提示词助手（API）",
        ),
    ];
    Ok(nodes)
}
