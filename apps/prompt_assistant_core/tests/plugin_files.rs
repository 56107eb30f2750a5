//! 插件目录下随附的模板与示例配置

use std::path::PathBuf;

use prompt_assistant_core::{
    config::{ApiConfig, OllamaConfig},
    template::{
        render, ENHANCEMENT_TEMPLATE, EXPANSION_TEMPLATE, TAGGER_TEMPLATE, TRANSLATION_TEMPLATE,
    },
    OpenAiBackend, TemplateStore,
};

fn plugin_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[test]
fn test_default_templates() -> anyhow::Result<()> {
    let store = TemplateStore::new(plugin_root().join("templates"));

    for name in [
        ENHANCEMENT_TEMPLATE,
        EXPANSION_TEMPLATE,
        TRANSLATION_TEMPLATE,
        TAGGER_TEMPLATE,
    ] {
        let template = store.load(name)?;
        assert!(template.contains("{text}"), "{name} has no placeholder");

        let rendered = render(&template, "一只猫");
        assert!(rendered.contains("一只猫"));
        assert!(!rendered.contains("{text}"));
    }

    let enhancement = store.load(ENHANCEMENT_TEMPLATE)?;
    assert!(enhancement.contains("<think>"));
    assert!(enhancement.contains("优化后的提示词："));
    Ok(())
}

#[test]
fn test_example_configs() -> anyhow::Result<()> {
    let root = plugin_root();

    let api = ApiConfig::from_file(root.join("api_config.example.json"))?;
    assert_eq!(api.api_base, "https://api.openai.com/v1");
    assert_eq!(api.api_max_tokens, 1000);
    OpenAiBackend::new(&api)?;

    let ollama = OllamaConfig::from_file(root.join("ollama_config.example.json"))?;
    assert_eq!(ollama.template_dir, "templates");
    assert_eq!(ollama.default_model, "llama2");
    Ok(())
}
