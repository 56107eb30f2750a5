//! CLIP 标签
//!
//! 质量标签、关键词触发的风格标签, 以及不依赖模型的关键词拆分

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STOP_WORDS_RE: Regex =
        Regex::new(r"\b(?:is|are|the|a|an|with|by|in|on|at|to|and|of)\b").unwrap();
    static ref PHRASE_SPLIT_RE: Regex = Regex::new(r"[,.;，。；]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// 基础质量标签
pub const QUALITY_TAGS: &[&str] = &[
    "(masterpiece:1.2)",
    "(best quality:1.2)",
    "(detailed:1.1)",
    "(sharp focus:1.1)",
];

/// 风格标签: (触发关键词, 追加的标签)
pub const STYLE_TAGS: &[(&[&str], &[&str])] = &[
    (
        &["cinematic", "movie", "film"],
        &["(cinematic lighting:1.2)", "(dramatic atmosphere:1.1)"],
    ),
    (
        &["space", "futuristic", "sci-fi"],
        &["(sci-fi:1.2)", "(futuristic:1.1)", "(high tech:1.1)"],
    ),
];

/// 根据关键词返回风格标签
pub fn style_tags(text: &str) -> Vec<&'static str> {
    let text = text.to_lowercase();
    STYLE_TAGS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .flat_map(|(_, tags)| tags.iter().copied())
        .collect()
}

/// 去重后以 `, ` 连接, 保留首次出现的顺序
pub fn merge_tags<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || !seen.insert(tag.to_string()) {
            continue;
        }
        result.push(tag.to_string());
    }
    result.join(", ")
}

/// 质量标签 + 风格标签 + 给定标签
pub fn with_quality_tags<S: AsRef<str>>(source_text: &str, tags: &[S]) -> String {
    let prefix = QUALITY_TAGS
        .iter()
        .copied()
        .chain(style_tags(source_text))
        .map(str::to_string);
    merge_tags(prefix.chain(tags.iter().map(|t| t.as_ref().to_string())))
}

/// 不调用模型, 直接从英文描述中拆分关键词
///
/// 空文本时返回质量标签 (`with_quality` 为 false 时返回空字符串)
pub fn tags_from_text(text: &str, with_quality: bool) -> String {
    let text = text.to_lowercase();
    let text = STOP_WORDS_RE.replace_all(&text, "");

    let words = PHRASE_SPLIT_RE
        .split(&text)
        .map(|part| WHITESPACE_RE.replace_all(part.trim(), " ").trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();

    if with_quality {
        with_quality_tags(&text, &words)
    } else {
        merge_tags(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_from_empty_text() {
        assert_eq!(tags_from_text("", true), QUALITY_TAGS.join(", "));
        assert_eq!(tags_from_text("   ", true), QUALITY_TAGS.join(", "));
        assert_eq!(tags_from_text("", false), "");
    }

    #[test]
    fn test_stop_words_keep_longer_words() {
        assert_eq!(
            tags_from_text("The cat is in the garden, Another island.", false),
            "cat garden, another island"
        );
    }

    #[test]
    fn test_style_tags() {
        let tags = tags_from_text("A cinematic shot of a futuristic city", true);
        assert_eq!(
            tags,
            "(masterpiece:1.2), (best quality:1.2), (detailed:1.1), (sharp focus:1.1), \
             (cinematic lighting:1.2), (dramatic atmosphere:1.1), \
             (sci-fi:1.2), (futuristic:1.1), (high tech:1.1), \
             cinematic shot futuristic city"
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(
            tags_from_text("red dress; smile, red dress。smile", false),
            "red dress, smile"
        );
        assert_eq!(merge_tags(["b", "a", " b ", "", "c", "a"]), "b, a, c");
    }
}
