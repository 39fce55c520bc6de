//! SEO content writer tool.
//!
//! Issues its own completion request and hands the article back as the final
//! answer of the reply, skipping the model's summarising turn.

use async_trait::async_trait;
use std::sync::Arc;

use super::{string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::api::ModelClient;
use crate::error::ToolError;
use crate::types::{ChatRequest, Message};

pub const DEFAULT_WRITER_MODEL: &str = "gpt-3.5-turbo";

/// Company context woven into the writer's system prompt.
#[derive(Debug, Clone)]
pub struct WriterProfile {
    pub company_name: String,
    pub company_description: String,
    pub model: String,
}

/// Tool producing a markdown SEO article with an FAQ section.
pub struct ContentWriterTool {
    client: Arc<dyn ModelClient>,
    profile: WriterProfile,
    params: Vec<ToolParam>,
}

impl ContentWriterTool {
    pub fn new(client: Arc<dyn ModelClient>, profile: WriterProfile) -> Self {
        Self {
            client,
            profile,
            params: vec![
                ToolParam::required(
                    "keywords",
                    ParamType::String,
                    "A comma-separated list of keywords that are relevant for the article.",
                ),
                ToolParam::required(
                    "product",
                    ParamType::String,
                    "Product to write the article for.",
                ),
                ToolParam::required(
                    "structure",
                    ParamType::String,
                    "Approximate length, structural requirements, language requirements, writing advice for the article.",
                ),
                ToolParam::required(
                    "examples",
                    ParamType::String,
                    "Examples of great sentences or short text excerpts that should be considered.",
                ),
            ],
        }
    }

    fn request(&self, arguments: &Arguments) -> Result<ChatRequest, ToolError> {
        let system = format!(
            "You are a SEO writing engine. Based on some inputs, you write an article that advertises a given product and is readable and includes relevant keywords and more. Use markdown notation.\n\
             You work for {}. {}\n\
             Do not mention the competition.",
            self.profile.company_name, self.profile.company_description
        );
        let user = format!(
            "Please write a SEO text about this:\n\
             Product: {}\n\
             Relevant keywords: {}\n\
             Other requirements: {}\n\
             Examples from other websites: {}\n\
             \n\
             Please use this output format:\n\
             ```\n\
             # Your headline\n\
             Your SEO article\n\
             \n\
             # FAQ\n\
             **Question**: each question\n\
             **Answer**: each answer\n\
             ```",
            string_arg(arguments, "product")?,
            string_arg(arguments, "keywords")?,
            string_arg(arguments, "structure")?,
            string_arg(arguments, "examples")?,
        );
        Ok(ChatRequest {
            model: self.profile.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            tools: None,
            temperature: None,
        })
    }
}

#[async_trait]
impl Tool for ContentWriterTool {
    fn name(&self) -> &str {
        "SEO Writer"
    }

    fn description(&self) -> &str {
        "Write a SEO relevant article with some information."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let request = self.request(arguments)?;
        let response = self
            .client
            .chat(&request)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        let article = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty());
        let results = article.into_iter().collect();
        Ok(ToolResult::new(self.name(), results).into_final())
    }
}
