//! 提示词处理流水线
//!
//! Start → [Enhance?] → Translate → GenerateTags → Done
//!
//! 每个阶段: 读取模板 → 填入输入 → 调用模型 → 清理输出.
//! 模板缺失时跳过该阶段, 输入原样传递; 后端失败按 [`FailurePolicy`] 处理.

use log::{debug, error, info, warn};
use strum_macros::Display;

use super::{
    pipeline_options::{FailurePolicy, PipelineOptions, TagSource},
    response::{Enhancement, PipelineResult},
};
use crate::{
    backend::Backend,
    cleaner::{
        clean_tagger_response, clean_translation, extract_labeled_section, extract_think_block,
        join_lines, strip_bracket_annotations, strip_leading_separator, strip_think_block,
    },
    error::Result,
    tagger::{merge_tags, tags_from_text, with_quality_tags},
    template::{render, TemplateStore, TAGGER_TEMPLATE, TRANSLATION_TEMPLATE},
};

/// 优化后提示词的标签
pub const PROMPT_LABELS: &[&str] = &["优化后的提示词：", "优化后的提示词:", "optimized prompt:"];

/// 模型未给出分析过程时的默认内容
pub const DEFAULT_ANALYSIS: &str = "请分析场景的主体、环境、构图、光影和细节特征";

/// 回复格式不符时的修正提示词
pub const CORRECTIVE_TEMPLATE: &str = "请将以下内容整理为规范格式：
1. 分析部分放在<think>标签内
2. 场景描述放在“优化后的提示词：”之后输出
3. 去掉所有标题和分类
4. 确保描述自然流畅

内容：
{text}";

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum Stage {
    Enhance,
    Translate,
    Tags,
}

/// 提示词处理流水线
///
/// 只借用只读的后端与模板目录, 可在多个线程中同时使用
pub struct PromptPipeline<'a> {
    backend: &'a dyn Backend,
    templates: &'a TemplateStore,
    options: PipelineOptions,
}

impl<'a> PromptPipeline<'a> {
    pub fn new(backend: &'a dyn Backend, templates: &'a TemplateStore) -> Self {
        Self {
            backend,
            templates,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 处理输入文本
    ///
    /// 返回 (预览, 英文提示词, 标签); 后端错误按失败策略返回时不产生任何部分输出
    pub fn process(&self, text: &str, enable_enhancement: bool) -> Result<PipelineResult> {
        info!(
            "process prompt, backend: {}, enhancement: {enable_enhancement}",
            self.backend.name()
        );

        let enhancement = if enable_enhancement {
            self.enhance(text)?
        } else {
            None
        };

        let source = enhancement
            .as_ref()
            .map(|v| v.prompt.as_str())
            .unwrap_or(text);
        let translated = self.translate(source)?;
        let tags = self.generate_tags(&translated)?;

        debug!("translated: {translated}, tags: {tags}");
        Ok(PipelineResult::new(
            text,
            enhancement.as_ref(),
            translated,
            tags,
        ))
    }

    /// 提示词优化
    ///
    /// 模板缺失或后端降级时返回 None, 调用方使用原始输入
    pub fn enhance(&self, text: &str) -> Result<Option<Enhancement>> {
        let template_name = &self.options.enhancement_template;
        let Some(template) = self.templates.read(template_name) else {
            warn!("template {template_name} is unavailable, skip enhancement");
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        let Some(mut response) = self.call(Stage::Enhance, &render(&template, text))? else {
            return Ok(None);
        };
        let (mut analysis, mut prompt) = parse_enhancement(&response);

        if self.options.corrective_retry && (analysis.is_none() || prompt.is_none()) {
            debug!("enhancement response is not in the expected format, ask for a reformat");
            let corrective = render(CORRECTIVE_TEMPLATE, &response);
            if let Some(retry) = self.call(Stage::Enhance, &corrective)? {
                (analysis, prompt) = parse_enhancement(&retry);
                response = retry;
            }
        }

        let analysis = match analysis {
            Some(v) => Some(v),
            None if self.options.corrective_retry => {
                warn!("analysis block not found, using the default analysis");
                Some(DEFAULT_ANALYSIS.to_string())
            }
            None => None,
        };

        let prompt = prompt.unwrap_or_else(|| {
            warn!("optimized prompt label not found, using the whole response");
            strip_think_block(&response)
        });
        let mut prompt = finalize_prompt(&prompt);
        if prompt.is_empty() {
            warn!("optimized prompt is empty, keep the original text");
            prompt = join_lines(text);
        }

        Ok(Some(Enhancement { analysis, prompt }))
    }

    /// 翻译为英文
    pub fn translate(&self, text: &str) -> Result<String> {
        let Some(template) = self.templates.read(TRANSLATION_TEMPLATE) else {
            warn!("template {TRANSLATION_TEMPLATE} is unavailable, pass the text through");
            return Ok(text.to_string());
        };
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        match self.call(Stage::Translate, &render(&template, text))? {
            Some(response) => {
                let translated = clean_translation(&response);
                if translated.is_empty() {
                    warn!("translation is empty after cleaning, raw response: {response}");
                }
                Ok(translated)
            }
            None => Ok(text.to_string()),
        }
    }

    /// 生成 CLIP 标签
    pub fn generate_tags(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let quality = self.options.quality_tags;
        if self.options.tag_source == TagSource::Heuristic {
            return Ok(tags_from_text(text, quality));
        }

        let Some(template) = self.templates.read(TAGGER_TEMPLATE) else {
            warn!("template {TAGGER_TEMPLATE} is unavailable, fall back to keyword tags");
            return Ok(tags_from_text(text, quality));
        };

        let Some(response) = self.call(Stage::Tags, &render(&template, text))? else {
            return Ok(tags_from_text(text, quality));
        };

        let tags = clean_tagger_response(&response);
        if tags.is_empty() {
            warn!("no tags parsed from the response, fall back to keyword tags");
            return Ok(tags_from_text(text, quality));
        }

        if quality {
            Ok(with_quality_tags(text, &tags))
        } else {
            Ok(merge_tags(tags))
        }
    }

    /// 调用后端, 按失败策略处理后端错误
    ///
    /// 返回 None 表示该阶段降级
    fn call(&self, stage: Stage, prompt: &str) -> Result<Option<String>> {
        let err = match self.backend.generate(prompt) {
            Ok(v) => return Ok(Some(v)),
            Err(e) if !e.is_backend() => return Err(e),
            Err(e) => e,
        };

        match self.options.failure_policy {
            FailurePolicy::Raise => {
                error!("{stage} stage failed, {err}");
                Err(err)
            }
            FailurePolicy::RetryOnce => {
                warn!("{stage} stage failed, retry once, {err}");
                self.backend.generate(prompt).map(Some).inspect_err(|e| {
                    error!("{stage} stage failed after retry, {e}");
                })
            }
            FailurePolicy::Passthrough => {
                warn!("{stage} stage failed, output degraded to the stage fallback, {err}");
                Ok(None)
            }
        }
    }
}

/// 解析优化结果, 返回 (分析过程, 优化后的提示词)
fn parse_enhancement(response: &str) -> (Option<String>, Option<String>) {
    let analysis = extract_think_block(response);
    let body = strip_think_block(response);
    let prompt = PROMPT_LABELS
        .iter()
        .find_map(|label| extract_labeled_section(&body, label));
    (analysis, prompt)
}

/// 移除方括号标注与开头的逗号, 合并为单行
fn finalize_prompt(prompt: &str) -> String {
    let prompt = strip_bracket_annotations(prompt);
    let prompt = strip_leading_separator(prompt.trim());
    join_lines(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enhancement() {
        let response = "<think>\n主体: 猫\n</think>\n\n优化后的提示词：\n[写实] 一只橘猫\n趴在窗台上";
        let (analysis, prompt) = parse_enhancement(response);
        assert_eq!(analysis.as_deref(), Some("主体: 猫"));
        assert_eq!(prompt.as_deref(), Some("[写实] 一只橘猫\n趴在窗台上"));
        assert_eq!(finalize_prompt(&prompt.unwrap()), "一只橘猫 趴在窗台上");
    }

    #[test]
    fn test_parse_enhancement_without_markers() {
        let (analysis, prompt) = parse_enhancement("just a description");
        assert!(analysis.is_none());
        assert!(prompt.is_none());
    }

    #[test]
    fn test_finalize_prompt() {
        assert_eq!(finalize_prompt("，a cat\n\n[note] on a sofa"), "a cat on a sofa");
        assert_eq!(finalize_prompt("[only annotation]"), "");
    }
}
