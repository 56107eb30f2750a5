//! API Prompt Assistant
//!
//! 通过 OpenAI 兼容接口处理提示词, 接口地址、密钥与模型读取自 api_config.json

use log::error;
use prompt_assistant_core::{
    config::{ApiConfig, API_CONFIG_FILE},
    OpenAiBackend, PipelineOptions, TemplateStore,
};
use pyo3::{
    exceptions::PyRuntimeError,
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyErr, PyResult, Python,
};

use super::{run_pipeline, RETURN_NAMES};
use crate::{
    core::{
        category::CATEGORY_LLM_ASSISTANT,
        plugin_dir,
        types::{NODE_BOOLEAN, NODE_STRING},
        PromptServer,
    },
    error::Error,
};

/// API Prompt Assistant
#[pyclass(subclass)]
pub struct APIPromptAssistant {
    backend: OpenAiBackend,
    templates: TemplateStore,
}

impl PromptServer for APIPromptAssistant {}

#[pymethods]
impl APIPromptAssistant {
    #[new]
    fn new(py: Python<'_>) -> PyResult<Self> {
        Self::init(py).map_err(|e| {
            error!("APIPromptAssistant init error, {e}");
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
        "Expand, translate and tag the prompt through an OpenAI compatible API configured in api_config.json."
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
                        text
                    }),
                )?;
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
        prompt_expansion: bool,
    ) -> PyResult<(String, String, String)> {
        let results = run_pipeline(
            py,
            &self.backend,
            &self.templates,
            PipelineOptions::expansion(),
            text,
            prompt_expansion,
        );

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("APIPromptAssistant error, {e}");
                if let Err(e) =
                    self.send_error(py, "APIPromptAssistant".to_string(), e.to_string())
                {
                    error!("send error failed, {e}");
                    return Err(PyErr::new::<PyRuntimeError, _>(e.to_string()));
                };
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }
}

impl APIPromptAssistant {
    /// 密钥缺失时构建失败, 不会发出任何请求
    fn init(py: Python<'_>) -> Result<Self, Error> {
        let dir = plugin_dir(py)?;
        let config = ApiConfig::from_file(dir.join(API_CONFIG_FILE))?;

        let backend = OpenAiBackend::new(&config)?;
        let templates = TemplateStore::new(dir.join(&config.template_dir));
        templates.ensure_dir()?;

        Ok(Self { backend, templates })
    }
}
