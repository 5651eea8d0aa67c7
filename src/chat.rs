//! Direct single-turn chat without retrieval.

use crate::config::Prompts;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use tracing::instrument;

/// Client for direct chat: one prompt in, one answer out, no history.
pub struct ChatClient {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: Prompts,
}

impl ChatClient {
    /// Create a new chat client for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Send a single prompt and return the model's answer.
    ///
    /// Empty prompts are rejected before anything goes over the wire.
    #[instrument(skip(self, prompt))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let prompt = validate_prompt(prompt)?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.chat.system.clone())
                .build()
                .map_err(|e| SvarError::Llm(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| SvarError::Llm(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| SvarError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Llm(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| SvarError::Llm("Empty response from LLM".to_string()))
    }
}

/// Reject empty or whitespace-only prompts.
fn validate_prompt(prompt: &str) -> Result<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(SvarError::InvalidInput(
            "Prompt must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_rejected() {
        assert!(matches!(
            validate_prompt(""),
            Err(SvarError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_prompt("   \n\t"),
            Err(SvarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_prompt_trimmed() {
        assert_eq!(validate_prompt("  hello  ").unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_before_any_call() {
        // No API key in the environment: if validation didn't short-circuit,
        // this would fail with an Llm error instead of InvalidInput.
        let client = ChatClient::new("gpt-4o-mini");
        let result = client.complete("   ").await;
        assert!(matches!(result, Err(SvarError::InvalidInput(_))));
    }
}
