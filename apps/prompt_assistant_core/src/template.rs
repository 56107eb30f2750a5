//! 提示词模板
//!
//! 模板为普通文本文件, 使用 `{text}` 作为输入占位符

use std::{
    fs,
    path::{Path, PathBuf},
};

use chardet::{charset2encoding, detect};
use encoding::{all::GB18030, label::encoding_from_whatwg_label, DecoderTrap, Encoding};
use log::{error, warn};

use crate::error::{Error, Result};

/// 提示词优化模板
pub const ENHANCEMENT_TEMPLATE: &str = "enhancement_template.txt";
/// 翻译模板
pub const TRANSLATION_TEMPLATE: &str = "translation_template.txt";
/// 标签生成模板
pub const TAGGER_TEMPLATE: &str = "tagger_template.txt";
/// 提示词扩写模板
pub const EXPANSION_TEMPLATE: &str = "expansion_template.txt";

const TEXT_PLACEHOLDER: &str = "text";

/// 模板目录
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 创建模板目录
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// 读取模板, 失败时返回 None
    pub fn read(&self, name: &str) -> Option<String> {
        match self.load(name) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("error reading template {name}: {e}");
                None
            }
        }
    }

    /// 读取模板
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(Error::TemplateMissing {
                name: name.to_string(),
            });
        }

        let bytes = fs::read(&path)?;
        decode_bytes(&bytes)
    }
}

/// 解码模板内容, 自动匹配文件编码
fn decode_bytes(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    // 优先尝试 UTF-8 解码
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    // GBK 模板按 GB18030 (GBK 超集) 严格解码
    if let Ok(s) = GB18030.decode(bytes, DecoderTrap::Strict) {
        return Ok(s);
    }

    // 检测其它编码（ISO-8859-1 等）
    let result = detect(bytes);
    if let Some(coder) = encoding_from_whatwg_label(charset2encoding(&result.0)) {
        return coder.decode(bytes, DecoderTrap::Strict).map_err(|e| {
            error!("decode error, {e}");
            Error::Decode(e.to_string())
        });
    }

    Err(Error::Decode(format!("unknown charset: {}", result.0)))
}

/// 将输入文本填入模板
///
/// 兼容 Python `str.format` 的写法: `{{` 与 `}}` 转义为单个花括号,
/// `{text}` 替换为输入, 其它花括号内容原样保留
pub fn render(template: &str, text: &str) -> String {
    let mut output = String::with_capacity(template.len() + text.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            output.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            output.push('}');
            rest = &tail[2..];
        } else if let Some(field) = tail
            .strip_prefix('{')
            .and_then(|v| v.strip_prefix(TEXT_PLACEHOLDER))
            .and_then(|v| v.strip_prefix('}'))
        {
            output.push_str(text);
            rest = field;
        } else {
            // 单个花括号
            output.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    output.push_str(rest);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(render("Translate: {text}", "一只猫"), "Translate: 一只猫");
        assert_eq!(
            render("{{\"prompt\": \"{text}\"}}", "cat"),
            "{\"prompt\": \"cat\"}"
        );
        assert_eq!(render("{other} {text}", "x"), "{other} x");
        assert_eq!(render("no placeholder", "x"), "no placeholder");
        assert_eq!(render("{text}{text}", "ab"), "abab");
        assert_eq!(render("dangling { and }", "x"), "dangling { and }");
    }

    #[test]
    fn test_read_missing_template() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = TemplateStore::new(dir.path());
        assert!(store.read(TRANSLATION_TEMPLATE).is_none());
        assert!(matches!(
            store.load(TRANSLATION_TEMPLATE),
            Err(Error::TemplateMissing { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_read_utf8_with_bom() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(TAGGER_TEMPLATE),
            "\u{feff}标签: {text}".as_bytes(),
        )?;
        let store = TemplateStore::new(dir.path());
        assert_eq!(store.read(TAGGER_TEMPLATE).as_deref(), Some("标签: {text}"));
        Ok(())
    }

    #[test]
    fn test_read_gbk() -> anyhow::Result<()> {
        use encoding::{all::GBK, EncoderTrap};

        let dir = tempfile::tempdir()?;
        let bytes = GBK
            .encode("请翻译成英文：{text}", EncoderTrap::Strict)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        fs::write(dir.path().join(TRANSLATION_TEMPLATE), bytes)?;

        let store = TemplateStore::new(dir.path());
        assert_eq!(
            store.read(TRANSLATION_TEMPLATE).as_deref(),
            Some("请翻译成英文：{text}")
        );
        Ok(())
    }

    #[test]
    fn test_read_verbatim() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let content = "line one\n\n  {text}\n";
        fs::write(dir.path().join(ENHANCEMENT_TEMPLATE), content)?;
        let store = TemplateStore::new(dir.path());
        assert_eq!(store.read(ENHANCEMENT_TEMPLATE).as_deref(), Some(content));
        Ok(())
    }

    #[test]
    fn test_ensure_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = TemplateStore::new(dir.path().join("nested").join("templates"));
        store.ensure_dir()?;
        assert!(store.dir().is_dir());
        Ok(())
    }
}
