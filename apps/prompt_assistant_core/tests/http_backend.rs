mod common;

use common::template_dir;
use mockito::Matcher;
use prompt_assistant_core::{
    template::{TAGGER_TEMPLATE, TRANSLATION_TEMPLATE},
    ApiConfig, Backend, Error, OllamaBackend, OpenAiBackend, PromptPipeline, TemplateStore,
};
use serde_json::json;

#[test]
fn test_openai_generate() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "hello"}],
            "max_tokens": 1000,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  A cat.  "}}]}"#)
        .create();

    let config = ApiConfig::new("sk-test").with_api_base(server.url());
    let backend = OpenAiBackend::new(&config)?;
    assert_eq!(backend.generate("hello")?, "A cat.");

    mock.assert();
    Ok(())
}

#[test]
fn test_openai_empty_choices() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create();

    let config = ApiConfig::new("sk-test").with_api_base(server.url());
    let backend = OpenAiBackend::new(&config)?;
    assert!(matches!(
        backend.generate("hello"),
        Err(Error::InvalidResponse { .. })
    ));
    Ok(())
}

#[test]
fn test_openai_unauthorized_fails_pipeline() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .expect(1)
        .create();

    let dir = template_dir(&[TRANSLATION_TEMPLATE, TAGGER_TEMPLATE])?;
    let store = TemplateStore::new(dir.path());
    let config = ApiConfig::new("sk-test").with_api_base(format!("{}/", server.url()));
    let backend = OpenAiBackend::new(&config)?;

    let result = PromptPipeline::new(&backend, &store).process("一只猫", false);

    match result {
        Err(Error::BackendStatus { status, body, .. }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    mock.assert();
    Ok(())
}

#[test]
fn test_ollama_generate() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5",
            "prompt": "hello",
            "stream": false,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"qwen2.5","response":"\nA cat.\n","done":true}"#)
        .create();

    let backend = OllamaBackend::new(&server.url(), "qwen2.5", 5)?;
    assert_eq!(backend.generate("hello")?, "A cat.");

    mock.assert();
    Ok(())
}

#[test]
fn test_ollama_not_found() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error":"model 'missing' not found"}"#)
        .create();

    let backend = OllamaBackend::new(&server.url(), "missing", 5)?;
    let err = backend.generate("hello").unwrap_err();
    assert!(err.is_backend());
    assert_eq!(err.status(), Some(404));
    Ok(())
}

#[test]
fn test_ollama_list_models() -> anyhow::Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"qwen2.5:7b","size":1},{"name":"llama3:8b"}]}"#)
        .create();

    let models = OllamaBackend::list_models(&server.url(), 5)?;
    assert_eq!(models, vec!["qwen2.5:7b", "llama3:8b"]);

    mock.assert();
    Ok(())
}

#[test]
fn test_transport_error() -> anyhow::Result<()> {
    let backend = OllamaBackend::new("http://127.0.0.1:1", "qwen2.5", 2)?;
    let err = backend.generate("hello").unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_backend());
    assert_eq!(err.status(), None);
    Ok(())
}
