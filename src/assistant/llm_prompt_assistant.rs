//! LLM Prompt Assistant
//!
//! 使用本地 Ollama 服务优化、翻译提示词并生成 CLIP 标签

use std::str::FromStr;

use log::error;
use prompt_assistant_core::{
    config::{DEFAULT_MODEL, DEFAULT_OLLAMA_HOST, DEFAULT_TIMEOUT_SECS},
    FailurePolicy, OllamaBackend, PipelineOptions, TemplateStore,
};
use pyo3::{
    exceptions::PyRuntimeError,
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyErr, PyResult, Python,
};

use super::{model_choices, run_pipeline, RETURN_NAMES};
use crate::{
    core::{
        category::CATEGORY_LLM_ASSISTANT,
        plugin_dir,
        types::{NODE_BOOLEAN, NODE_STRING},
        PromptServer,
    },
    error::Error,
};

/// 模板目录名, 相对插件目录
const TEMPLATE_DIR: &str = "templates";

/// LLM Prompt Assistant
#[pyclass(subclass)]
pub struct LLMPromptAssistant {
    templates: TemplateStore,
}

impl PromptServer for LLMPromptAssistant {}

#[pymethods]
impl LLMPromptAssistant {
    #[new]
    fn new(py: Python<'_>) -> PyResult<Self> {
        Self::init(py).map_err(|e| {
            error!("LLMPromptAssistant init error, {e}");
            PyErr::new::<PyRuntimeError, _>(e.to_string())
        })
    }

    #[classattr]
    #[pyo3(name = "INPUT_IS_LIST")]
    fn input_is_list() -> bool {
        false
    }

    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str, &'static str, &'static str) {
        (NODE_STRING, NODE_STRING, NODE_STRING)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str, &'static str) {
        RETURN_NAMES
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool, bool, bool) {
        (false, false, false)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_LLM_ASSISTANT;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Optimize the prompt with a local Ollama model, translate it into English and generate CLIP tags."
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item(
                    "text",
                    (NODE_STRING, {
                        let text = PyDict::new(py);
                        text.set_item("multiline", true)?;
                        text.set_item("tooltip", "原始提示词, 中英文均可")?;
                        text
                    }),
                )?;
                required.set_item(
                    "ollama_host",
                    (NODE_STRING, {
                        let ollama_host = PyDict::new(py);
                        ollama_host.set_item("default", DEFAULT_OLLAMA_HOST)?;
                        ollama_host.set_item("multiline", false)?;
                        ollama_host
                    }),
                )?;
                required.set_item(
                    "model",
                    (model_choices(py, DEFAULT_OLLAMA_HOST, DEFAULT_MODEL),),
                )?;
                required.set_item(
                    "enable_enhancement",
                    (NODE_BOOLEAN, {
                        let enable_enhancement = PyDict::new(py);
                        enable_enhancement.set_item("default", false)?;
                        enable_enhancement
                    }),
                )?;
                required.set_item(
                    "on_backend_error",
                    (FailurePolicy::options(), {
                        let on_backend_error = PyDict::new(py);
                        on_backend_error
                            .set_item("default", FailurePolicy::default().to_string())?;
                        on_backend_error.set_item(
                            "tooltip",
                            "raise: 报错中断; retry_once: 重试一次; passthrough: 跳过失败的步骤",
                        )?;
                        on_backend_error
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[pyo3(name = "execute")]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        text: &str,
        ollama_host: &str,
        model: &str,
        enable_enhancement: bool,
        on_backend_error: &str,
    ) -> PyResult<(String, String, String)> {
        let results = self.process(
            py,
            text,
            ollama_host,
            model,
            enable_enhancement,
            on_backend_error,
        );

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("LLMPromptAssistant error, {e}");
                if let Err(e) =
                    self.send_error(py, "LLMPromptAssistant".to_string(), e.to_string())
                {
                    error!("send error failed, {e}");
                    return Err(PyErr::new::<PyRuntimeError, _>(e.to_string()));
                };
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }
}

impl LLMPromptAssistant {
    fn init(py: Python<'_>) -> Result<Self, Error> {
        let templates = TemplateStore::new(plugin_dir(py)?.join(TEMPLATE_DIR));
        templates.ensure_dir()?;
        Ok(Self { templates })
    }

    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        py: Python<'_>,
        text: &str,
        ollama_host: &str,
        model: &str,
        enable_enhancement: bool,
        on_backend_error: &str,
    ) -> Result<(String, String, String), Error> {
        let failure_policy = FailurePolicy::from_str(on_backend_error)
            .map_err(|e| Error::ParseEnumString(format!("{on_backend_error}: {e}")))?;

        let backend = OllamaBackend::new(ollama_host, model, DEFAULT_TIMEOUT_SECS)?;
        let options = PipelineOptions::new().with_failure_policy(failure_policy);

        run_pipeline(
            py,
            &backend,
            &self.templates,
            options,
            text,
            enable_enhancement,
        )
    }
}
