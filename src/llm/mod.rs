pub mod queue;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::error::{GenerationError, TradingError};

pub use queue::{LLMQueue, Priority, QueueHandle};

/// The external text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Slice from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Generate and deserialize a JSON object. Prose around the object is ignored.
pub async fn generate_object<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    system_prompt: &str,
    prompt: &str,
) -> Result<T, GenerationError> {
    let text = generator.generate(system_prompt, prompt).await?;
    let json = extract_json(&text)
        .ok_or_else(|| GenerationError::Malformed(format!("no JSON object in response: {}", text)))?;
    serde_json::from_str(json).map_err(|e| GenerationError::Malformed(format!("{} (json: {})", e, json)))
}

#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
    pub model: String,
}

impl LLMClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        let client = Client::with_config(config);
        Self { client, model }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, TradingError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("LLM API key is not set".to_string()))?;
        Ok(Self::new(api_key, config.base_url.clone(), config.model.clone()))
    }

    pub async fn chat(&self, system_prompt: &str, user_input: &str) -> Result<String, GenerationError> {
        info!("🤖 Sending request to LLM (Model: {})...", self.model);

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_input)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        debug!("🤖 LLM Response received.");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Malformed("empty completion".to_string()))
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        self.chat(system_prompt, prompt).await
    }
}
