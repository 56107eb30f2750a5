//! 错误处理

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("option none, {0}")]
    OptionNone(String),
    #[error("strum error, {0}")]
    ParseEnumString(String),

    #[error("py error, {0}")]
    PyErr(#[from] pyo3::PyErr),
    #[error("py downcast error, {0}")]
    PyDowncastError(String),

    #[error(transparent)]
    PromptAssistantCoreError(#[from] prompt_assistant_core::Error),

    #[error("invalid directory, {0}")]
    InvalidDirectory(String),
}
