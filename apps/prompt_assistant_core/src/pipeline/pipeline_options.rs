//! 流水线配置

use strum::VariantNames;
use strum_macros::{Display, EnumString, VariantNames};

use crate::template::{ENHANCEMENT_TEMPLATE, EXPANSION_TEMPLATE};

/// 后端调用失败时的处理策略
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumString,
    Display,
    VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum FailurePolicy {
    /// 直接返回错误
    #[default]
    Raise,
    /// 重试一次, 仍失败则返回错误
    RetryOnce,
    /// 记录警告后使用该阶段的降级结果
    Passthrough,
}

impl FailurePolicy {
    /// 节点下拉选项
    pub fn options() -> Vec<String> {
        Self::VARIANTS.iter().map(|v| v.to_string()).collect()
    }
}

/// 标签来源
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumString,
    Display,
    VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum TagSource {
    /// 使用标签模板调用模型
    #[default]
    Llm,
    /// 本地关键词拆分
    Heuristic,
}

/// 流水线配置
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// 提示词优化阶段使用的模板
    pub enhancement_template: String,
    /// 回复格式不符时, 是否要求模型整理格式后重新解析
    pub corrective_retry: bool,
    pub tag_source: TagSource,
    /// 是否附加质量标签与风格标签
    pub quality_tags: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            enhancement_template: ENHANCEMENT_TEMPLATE.to_string(),
            corrective_retry: true,
            tag_source: TagSource::default(),
            quality_tags: true,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 扩写模式: 使用扩写模板, 不做格式修正重试
    pub fn expansion() -> Self {
        Self::default()
            .with_enhancement_template(EXPANSION_TEMPLATE)
            .with_corrective_retry(false)
    }
}

/// Builder 风格的便捷方法
impl PipelineOptions {
    pub fn with_enhancement_template(mut self, template: impl Into<String>) -> Self {
        self.enhancement_template = template.into();
        self
    }

    pub fn with_corrective_retry(mut self, corrective_retry: bool) -> Self {
        self.corrective_retry = corrective_retry;
        self
    }

    pub fn with_tag_source(mut self, tag_source: TagSource) -> Self {
        self.tag_source = tag_source;
        self
    }

    pub fn with_quality_tags(mut self, quality_tags: bool) -> Self {
        self.quality_tags = quality_tags;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}
