//! services/api/src/adapters/text_gen_llm.rs
//!
//! This module contains the adapter for the fallback text generator.
//! It implements the `TextGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use library_core::ports::{GenerationParams, PortError, PortResult, TextGenerationService};

const SYSTEM_PROMPT: &str = "You are the friendly assistant of a small library. \
Reply to the visitor in one or two short sentences. Do not use lists or markdown.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTextGenAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTextGenAdapter {
    /// Creates a new `OpenAiTextGenAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Translates the local-model sampling knobs into chat-completion penalties.
///
/// Returns `(frequency_penalty, presence_penalty)`, both clamped to the API's 0..=2 range.
fn penalties(params: &GenerationParams) -> (f32, f32) {
    let frequency = (params.repetition_penalty - 1.0).clamp(0.0, 2.0);
    let presence = if params.no_repeat_ngram_size > 0 {
        (1.0 / params.no_repeat_ngram_size as f32).clamp(0.0, 2.0)
    } else {
        0.0
    };
    (frequency, presence)
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiTextGenAdapter {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let (frequency_penalty, presence_penalty) = penalties(params);
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(params.max_tokens)
            .temperature(params.temperature)
            .top_p(params.top_p)
            .frequency_penalty(frequency_penalty)
            .presence_penalty(presence_penalty)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Text generation LLM returned no text content.".to_string())
            })
    }
}
