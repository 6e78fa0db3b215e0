pub mod analyst;
pub mod announcer;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::llm::{generate_object, TextGenerator};

pub use analyst::TradeAnalystAgent;
pub use announcer::AnnouncerAgent;

pub trait Agent {
    fn name(&self) -> &str;
    fn system_prompt(&self) -> &str;

    /// Free-form text response
    async fn run(&self, query: &str, llm: &dyn TextGenerator) -> Result<String, GenerationError> {
        info!("🤖 [AGENT] Sending request to {}...", self.name());
        let response = llm.generate(self.system_prompt(), query).await?;
        debug!("🤖 [AGENT] Response from {}: {}", self.name(), response);
        Ok(response)
    }

    /// Response parsed as a JSON object of type `T`
    async fn run_object<T: DeserializeOwned>(&self, query: &str, llm: &dyn TextGenerator) -> Result<T, GenerationError> {
        info!("🤖 [AGENT] Sending structured request to {}...", self.name());
        generate_object(llm, self.system_prompt(), query).await
    }
}
