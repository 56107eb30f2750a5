//! 插件目录
//!
//! 模板与配置文件都相对插件目录存放.
//! 优先读取环境变量 `LLM_ASSISTANT_DIR`, 否则使用已加载扩展模块所在的目录.

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::{info, warn};
use pyo3::{
    types::{PyAnyMethods, PyDict, PyDictMethods, PyModule},
    Python,
};

use crate::{error::Error, MODULE_NAME};

/// 插件目录环境变量
pub const PLUGIN_DIR_ENV: &str = "LLM_ASSISTANT_DIR";

static PLUGIN_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 获取插件目录
pub fn plugin_dir(py: Python<'_>) -> Result<PathBuf, Error> {
    if let Some(dir) = PLUGIN_DIR.get() {
        return Ok(dir.clone());
    }

    let dir = match env::var(PLUGIN_DIR_ENV) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => module_dir(py)?,
    };
    if !dir.is_dir() {
        return Err(Error::InvalidDirectory(dir.display().to_string()));
    }

    info!("plugin directory: {}", dir.display());
    Ok(PLUGIN_DIR.get_or_init(|| dir).clone())
}

/// 在 sys.modules 中查找当前扩展模块, 返回其所在目录
fn module_dir(py: Python<'_>) -> Result<PathBuf, Error> {
    let modules = PyModule::import(py, "sys")?.getattr("modules")?;
    let modules = modules
        .downcast::<PyDict>()
        .map_err(|e| Error::PyDowncastError(e.to_string()))?;

    let suffix = format!(".{MODULE_NAME}");
    for (name, module) in modules.iter() {
        let Ok(name) = name.extract::<String>() else {
            continue;
        };
        if name != MODULE_NAME && !name.ends_with(&suffix) {
            continue;
        }

        match module
            .getattr("__file__")
            .and_then(|v| v.extract::<String>())
        {
            Ok(file) => {
                if let Some(parent) = Path::new(&file).parent() {
                    return Ok(parent.to_path_buf());
                }
            }
            Err(e) => warn!("module {name} has no __file__, {e}"),
        }
    }

    Err(Error::OptionNone(format!(
        "module {MODULE_NAME} not found, set {PLUGIN_DIR_ENV} to the plugin directory"
    )))
}
