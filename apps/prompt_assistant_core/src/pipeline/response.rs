//! 流水线输出

/// 原文标题
pub const HEADING_ORIGINAL: &str = "原文：";
/// 优化后提示词标题
pub const HEADING_PROMPT: &str = "优化后的提示词：";
/// 译文标题
pub const HEADING_TRANSLATION: &str = "译文：";

/// 提示词优化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    /// 分析过程, 扩写模式下模型未给出时为空
    pub analysis: Option<String>,
    /// 优化后的提示词 (单行)
    pub prompt: String,
}

/// 一次调用的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    /// 预览文本
    pub preview: String,
    /// 英文提示词
    pub translated: String,
    /// CLIP 标签
    pub tags: String,
}

impl PipelineResult {
    pub(crate) fn new(
        original: &str,
        enhancement: Option<&Enhancement>,
        translated: String,
        tags: String,
    ) -> Self {
        let preview = build_preview(original, enhancement, &translated);
        Self {
            preview,
            translated,
            tags,
        }
    }

    /// (preview_prompt, output_prompt, tagger_prompt)
    pub fn into_tuple(self) -> (String, String, String) {
        (self.preview, self.translated, self.tags)
    }
}

/// 组装预览文本
fn build_preview(original: &str, enhancement: Option<&Enhancement>, translated: &str) -> String {
    let mut preview = format!("{HEADING_ORIGINAL}\n{original}\n\n");

    if let Some(enhancement) = enhancement {
        if let Some(analysis) = &enhancement.analysis {
            preview += &format!("<think>\n{analysis}\n</think>\n\n");
        }
        preview += &format!("{HEADING_PROMPT}\n{}\n\n", enhancement.prompt);
    }

    preview += &format!("{HEADING_TRANSLATION}\n{translated}");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_without_enhancement() {
        let result = PipelineResult::new("一只猫", None, "A cat".to_string(), "cat".to_string());
        assert_eq!(result.preview, "原文：\n一只猫\n\n译文：\nA cat");
    }

    #[test]
    fn test_preview_with_enhancement() {
        let enhancement = Enhancement {
            analysis: Some("主体是猫".to_string()),
            prompt: "一只橘猫趴在窗台上".to_string(),
        };
        let result = PipelineResult::new(
            "一只猫",
            Some(&enhancement),
            "An orange cat".to_string(),
            String::new(),
        );
        assert_eq!(
            result.preview,
            "原文：\n一只猫\n\n<think>\n主体是猫\n</think>\n\n优化后的提示词：\n一只橘猫趴在窗台上\n\n译文：\nAn orange cat"
        );

        let (preview, translated, tags) = result.into_tuple();
        assert!(preview.starts_with("原文："));
        assert_eq!(translated, "An orange cat");
        assert_eq!(tags, "");
    }
}
