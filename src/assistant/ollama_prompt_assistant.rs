//! Ollama Prompt Assistant
//!
//! 从插件目录下的 ollama_config.json 读取服务地址与模板目录

use log::{error, warn};
use prompt_assistant_core::{
    config::{OllamaConfig, DEFAULT_MODEL, OLLAMA_CONFIG_FILE},
    OllamaBackend, PipelineOptions, TemplateStore,
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

/// Ollama Prompt Assistant
#[pyclass(subclass)]
pub struct OllamaPromptAssistant {
    config: OllamaConfig,
    templates: TemplateStore,
}

impl PromptServer for OllamaPromptAssistant {}

#[pymethods]
impl OllamaPromptAssistant {
    #[new]
    fn new(py: Python<'_>) -> PyResult<Self> {
        Self::init(py).map_err(|e| {
            error!("OllamaPromptAssistant init error, {e}");
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
        "Expand, translate and tag the prompt with the Ollama server configured in ollama_config.json."
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            // 配置无效时仍然返回默认模型, 执行时再报错
            let models = match Self::load_config(py) {
                Ok(config) => model_choices(py, &config.ollama_host, &config.default_model),
                Err(e) => {
                    warn!("failed to load {OLLAMA_CONFIG_FILE}, {e}");
                    vec![DEFAULT_MODEL.to_string()]
                }
            };

            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item(
                    "text",
                    (NODE_STRING, {
                        let text = PyDict::new(py);
                        text.set_item("multiline", true)?;
                        text
                    }),
                )?;
                required.set_item("model", (models,))?;
                required.set_item(
                    "prompt_expansion",
                    (NODE_BOOLEAN, {
                        let prompt_expansion = PyDict::new(py);
                        prompt_expansion.set_item("default", false)?;
                        prompt_expansion
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        text: &str,
        model: &str,
        prompt_expansion: bool,
    ) -> PyResult<(String, String, String)> {
        let results = self.process(py, text, model, prompt_expansion);

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("OllamaPromptAssistant error, {e}");
                if let Err(e) =
                    self.send_error(py, "OllamaPromptAssistant".to_string(), e.to_string())
                {
                    error!("send error failed, {e}");
                    return Err(PyErr::new::<PyRuntimeError, _>(e.to_string()));
                };
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }
}

impl OllamaPromptAssistant {
    fn init(py: Python<'_>) -> Result<Self, Error> {
        let config = Self::load_config(py)?;
        let templates = TemplateStore::new(plugin_dir(py)?.join(&config.template_dir));
        templates.ensure_dir()?;
        Ok(Self { config, templates })
    }

    fn load_config(py: Python<'_>) -> Result<OllamaConfig, Error> {
        let path = plugin_dir(py)?.join(OLLAMA_CONFIG_FILE);
        let config = OllamaConfig::from_file(path)?;
        Ok(config)
    }

    fn process(
        &self,
        py: Python<'_>,
        text: &str,
        model: &str,
        prompt_expansion: bool,
    ) -> Result<(String, String, String), Error> {
        let backend = OllamaBackend::from_config(&self.config, model)?;

        run_pipeline(
            py,
            &backend,
            &self.templates,
            PipelineOptions::expansion(),
            text,
            prompt_expansion,
        )
    }
}
