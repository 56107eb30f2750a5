//! 模型回复清理
//!
//! 模型输出格式并不稳定: 可能带有思考过程, 可能复述指令, 也可能混杂中文.
//! 这里的每个函数都只做一件事, 对任意输入 (包括空字符串) 都返回结果, 不会失败.
//! 匹配不到预期结构时返回能拿到的最佳子串.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref THINK_RE: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
    static ref THINK_CAPTURE_RE: Regex = Regex::new(r"(?s)<think>(.*?)</think>").unwrap();
    static ref CJK_RE: Regex = Regex::new(r"[\u4e00-\u9fff]").unwrap();
    static ref INSTRUCTION_ECHO_RE: Regex = Regex::new(r"(?is)translation:.*?text:").unwrap();
    static ref CODE_FENCE_RE: Regex = Regex::new(r"```[A-Za-z0-9_+-]*").unwrap();
    static ref SCENE_DESCRIPTION_RE: Regex = Regex::new(r"(?i)scene description:").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref SPACE_BEFORE_PUNCT_RE: Regex = Regex::new(r"\s+([,.!?])").unwrap();
    static ref BRACKET_RE: Regex = Regex::new(r"(?s)\[.*?\]").unwrap();
    static ref SUB_LABEL_RE: Regex = {
        let labels = SUB_LABELS
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i)(?:{labels})")).unwrap()
    };
    static ref SECTION_LABEL_RE: Regex = {
        let labels = SECTION_LABELS
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\n[ \t]*(?:{labels})")).unwrap()
    };
    static ref BLANK_LINE_RE: Regex = Regex::new(r"\n[ \t\r]*\n").unwrap();
    static ref LABEL_LINE_RE: Regex = Regex::new(r".*:\s*\n").unwrap();
    static ref TAG_SPLIT_RE: Regex = Regex::new(r"[,，]").unwrap();
}

/// 翻译结果中常见的前缀, 按顺序各检查一次
pub const BOILERPLATE_PREFIXES: &[&str] = &[
    "here's the translation:",
    "translated text:",
    "english version:",
    "translation:",
    "英文翻译：",
    "翻译结果：",
    "请将下面的中文文本翻译成英文",
    "直接输出英文结果：",
];

/// 分段标签, 段落内容截止到下一个分段标签 (行首)
pub const SECTION_LABELS: &[&str] = &[
    "优化后的提示词：",
    "优化后的提示词:",
    "optimized prompt:",
    "译文：",
    "译文:",
    "translation:",
    "原文：",
    "原文:",
    "original:",
    "<think>",
];

/// 段落内需要移除的小标题
pub const SUB_LABELS: &[&str] = &[
    "scene description:",
    "analysis:",
    "suggestion:",
    "场景描述：",
    "分析：",
    "建议：",
];

/// 移除所有 `<think>...</think>` 思考过程
///
/// 只有结束标签时 (部分推理模型省略开始标签), 移除结束标签及其之前的内容
pub fn strip_think_block(text: &str) -> String {
    let text = THINK_RE.replace_all(text, "");
    match text.rfind("</think>") {
        Some(pos) => text[pos + "</think>".len()..].to_string(),
        None => text.into_owned(),
    }
}

/// 提取第一个思考过程的内容
pub fn extract_think_block(text: &str) -> Option<String> {
    THINK_CAPTURE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 移除所有中文汉字 (CJK 统一表意文字)
pub fn strip_source_script(text: &str) -> String {
    CJK_RE.replace_all(text, "").into_owned()
}

/// 移除代码块标记、指令复述与常见前缀
pub fn strip_known_boilerplate(text: &str) -> String {
    let text = INSTRUCTION_ECHO_RE.replace_all(text, "");
    let text = CODE_FENCE_RE.replace_all(&text, "");
    let text = SCENE_DESCRIPTION_RE.replace_all(&text, "");

    let mut result = text.trim();
    for prefix in BOILERPLATE_PREFIXES {
        if let Some(rest) = strip_prefix_ignore_case(result, prefix) {
            result = rest.trim();
        }
    }

    result.to_string()
}

/// 合并连续空白, 并移除标点前的空白
pub fn normalize_whitespace(text: &str) -> String {
    let text = WHITESPACE_RE.replace_all(text.trim(), " ");
    SPACE_BEFORE_PUNCT_RE
        .replace_all(&text, "$1")
        .trim()
        .to_string()
}

/// 移除方括号标注, 如 `[场景说明]`
pub fn strip_bracket_annotations(text: &str) -> String {
    BRACKET_RE.replace_all(text, "").into_owned()
}

/// 移除开头的一个逗号 (中英文)
pub fn strip_leading_separator(text: &str) -> &str {
    text.strip_prefix(',')
        .or_else(|| text.strip_prefix('，'))
        .unwrap_or(text)
}

/// 多行合并为单行
pub fn join_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 提取标签之后的段落
///
/// 段落截止到空行、下一个行首的分段标签或文本末尾, 以先出现者为准,
/// 并移除开头的逗号与段内小标题. 找不到标签或段落为空时返回 None
pub fn extract_labeled_section(text: &str, label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let label_re = Regex::new(&format!("(?i){}", regex::escape(label))).ok()?;
    let start = label_re.find(text)?.end();
    // 标签后紧跟的空行不算段落结束
    let rest = text[start..].trim_start();

    let end = [&*BLANK_LINE_RE, &*SECTION_LABEL_RE]
        .iter()
        .filter_map(|re| re.find(rest).map(|m| m.start()))
        .min()
        .unwrap_or(rest.len());

    let section = strip_leading_separator(rest[..end].trim());
    let section = SUB_LABEL_RE.replace_all(section, "");
    let section = section.trim();

    if section.is_empty() {
        return None;
    }
    Some(section.to_string())
}

/// 清理翻译结果
pub fn clean_translation(text: &str) -> String {
    let text = strip_think_block(text);
    let text = strip_known_boilerplate(&text);
    let text = strip_source_script(&text);
    normalize_whitespace(&text)
}

/// 清理标签生成结果, 返回标签列表
///
/// 回复中存在以冒号结尾的分析段落时, 只保留最后一段
pub fn clean_tagger_response(text: &str) -> Vec<String> {
    let text = strip_think_block(text);

    let text = if LABEL_LINE_RE.is_match(&text) {
        let last = LABEL_LINE_RE
            .split(&text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string);
        match last {
            Some(v) => v,
            None => text,
        }
    } else {
        text
    };

    let text = strip_source_script(&text);
    TAG_SPLIT_RE
        .split(&text)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// 忽略大小写的前缀匹配
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let len = prefix.len();
    if text.len() < len || !text.is_char_boundary(len) {
        return None;
    }
    if text[..len].to_lowercase() == prefix.to_lowercase() {
        return Some(&text[len..]);
    }
    None
}
