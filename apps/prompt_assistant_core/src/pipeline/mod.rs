//! Pipeline module for processing prompts

mod pipeline_impl;
mod pipeline_options;
mod response;

pub use pipeline_impl::{PromptPipeline, CORRECTIVE_TEMPLATE, DEFAULT_ANALYSIS, PROMPT_LABELS};
pub use pipeline_options::{FailurePolicy, PipelineOptions, TagSource};
pub use response::{
    Enhancement, PipelineResult, HEADING_ORIGINAL, HEADING_PROMPT, HEADING_TRANSLATION,
};
