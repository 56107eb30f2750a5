//! 测试公共工具

#![allow(dead_code)]

use std::{collections::VecDeque, fs, sync::Mutex};

use prompt_assistant_core::{
    template::{
        ENHANCEMENT_TEMPLATE, EXPANSION_TEMPLATE, TAGGER_TEMPLATE, TRANSLATION_TEMPLATE,
    },
    Backend, Error, Result,
};
use tempfile::TempDir;

/// 预设的后端回复
pub enum Reply {
    Text(String),
    Status(u16),
}

impl Reply {
    pub fn text(v: &str) -> Self {
        Reply::Text(v.to_string())
    }
}

/// 按顺序返回预设回复, 并记录收到的提示词
pub struct FakeBackend {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(v)) => Ok(v),
            Some(Reply::Status(status)) => Err(Error::BackendStatus {
                backend: "fake".to_string(),
                status,
                body: "scripted failure".to_string(),
            }),
            None => panic!("unexpected backend call: {prompt}"),
        }
    }
}

/// 模板内容, 以标记开头方便断言
pub fn template_content(name: &str) -> &'static str {
    match name {
        ENHANCEMENT_TEMPLATE => "ENHANCE:\n{text}",
        EXPANSION_TEMPLATE => "EXPAND:\n{text}",
        TRANSLATION_TEMPLATE => "TRANSLATE:\n{text}",
        TAGGER_TEMPLATE => "TAGS:\n{text}",
        _ => "{text}",
    }
}

/// 创建只包含指定模板的临时目录
pub fn template_dir(names: &[&str]) -> anyhow::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    for name in names {
        fs::write(dir.path().join(name), template_content(name))?;
    }
    Ok(dir)
}
