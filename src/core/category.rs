//! 节点分类

/// LLM 提示词助手
pub const CATEGORY_LLM_ASSISTANT: &str = "LLM-Assistant";
