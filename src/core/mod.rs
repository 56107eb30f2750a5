//! 公共库
//!
//! 相关节点定义: ComfyUI/comfy/comfy_types/node_typing.py

use pyo3::{
    exceptions::PyRuntimeError,
    pyfunction,
    types::{PyModule, PyModuleMethods},
    wrap_pyfunction, Bound, PyErr, PyResult, Python,
};

mod prompt_server;
pub use prompt_server::PromptServer;

mod plugin_dir;
pub use plugin_dir::{plugin_dir, PLUGIN_DIR_ENV};

pub mod category;
pub mod node;
pub mod types;

/// 插件目录, 便于在 ComfyUI 中排查模板与配置文件的位置
#[pyfunction]
#[pyo3(name = "plugin_directory")]
fn plugin_directory(py: Python<'_>) -> PyResult<String> {
    plugin_dir(py)
        .map(|dir| dir.display().to_string())
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
}

/// 核心模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "core")?;
    submodule.add_function(wrap_pyfunction!(plugin_directory, &submodule)?)?;
    Ok(submodule)
}
