//! OpenAI chat completions.

use super::ChatModel;
use crate::config::OpenAISettings;
use crate::error::{ContrailError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAIChat {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChat {
    pub fn new(model: &str, temperature: f32, settings: &OpenAISettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn call(&self, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = system {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| ContrailError::Model(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| ContrailError::Model(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ContrailError::Model(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            ContrailError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ContrailError::Model("Empty response from model".to_string()))?;

        debug!("Model replied with {} characters", answer.len());
        Ok(answer)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
