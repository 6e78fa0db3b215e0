use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, info};

use super::TextGenerator;
use crate::error::GenerationError;

/// Priority level for LLM requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// Trade decisions, which gate execution in the current iteration
    High,
    /// Announcements and other follow-up writing
    Normal,
}

/// A request to be queued for LLM processing
struct QueuedRequest {
    system_prompt: String,
    user_input: String,
    response_tx: oneshot::Sender<Result<String, GenerationError>>,
}

/// LLM Queue that limits concurrent requests and serves decisions before announcements
#[derive(Clone)]
pub struct LLMQueue {
    high_tx: mpsc::Sender<QueuedRequest>,
    normal_tx: mpsc::Sender<QueuedRequest>,
}

impl LLMQueue {
    /// Create a new LLM Queue over `generator` with the given concurrency bound
    pub fn new(generator: Arc<dyn TextGenerator>, max_concurrent: usize, queue_size: usize) -> Self {
        let (high_tx, high_rx) = mpsc::channel::<QueuedRequest>(queue_size.max(1));
        let (normal_tx, normal_rx) = mpsc::channel::<QueuedRequest>(queue_size.max(1));

        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        tokio::spawn(Self::process_queue(generator, semaphore, high_rx, normal_rx));

        Self { high_tx, normal_tx }
    }

    /// Process queued requests, prioritizing high-priority over normal-priority
    async fn process_queue(
        generator: Arc<dyn TextGenerator>,
        semaphore: Arc<Semaphore>,
        mut high_rx: mpsc::Receiver<QueuedRequest>,
        mut normal_rx: mpsc::Receiver<QueuedRequest>,
    ) {
        info!(
            "📬 [QUEUE] LLM Queue processor started (max concurrent: {})",
            semaphore.available_permits()
        );

        loop {
            let request = tokio::select! {
                biased;

                Some(req) = high_rx.recv() => {
                    debug!("📬 [QUEUE] Processing HIGH priority request");
                    req
                }
                Some(req) = normal_rx.recv() => {
                    debug!("📬 [QUEUE] Processing NORMAL priority request");
                    req
                }
                else => {
                    info!("📬 [QUEUE] All channels closed, shutting down");
                    break;
                }
            };

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = request.response_tx.send(Err(GenerationError::QueueClosed));
                    continue;
                }
            };

            debug!(
                "📬 [QUEUE] Acquired permit. {} slots remaining",
                semaphore.available_permits()
            );

            let generator = generator.clone();
            tokio::spawn(async move {
                let result = generator
                    .generate(&request.system_prompt, &request.user_input)
                    .await;

                let _ = request.response_tx.send(result);
                drop(permit);
            });
        }
    }

    /// Send a chat request with the specified priority
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_input: &str,
        priority: Priority,
    ) -> Result<String, GenerationError> {
        let (response_tx, response_rx) = oneshot::channel();

        let request = QueuedRequest {
            system_prompt: system_prompt.to_string(),
            user_input: user_input.to_string(),
            response_tx,
        };

        let send_result = match priority {
            Priority::High => self.high_tx.send(request).await,
            Priority::Normal => self.normal_tx.send(request).await,
        };

        if send_result.is_err() {
            return Err(GenerationError::QueueClosed);
        }

        response_rx.await.map_err(|_| GenerationError::Cancelled)?
    }

    /// A generator bound to one priority lane
    pub fn handle(&self, priority: Priority) -> QueueHandle {
        QueueHandle {
            queue: self.clone(),
            priority,
        }
    }
}

#[derive(Clone)]
pub struct QueueHandle {
    queue: LLMQueue,
    priority: Priority,
}

impl QueueHandle {
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

#[async_trait]
impl TextGenerator for QueueHandle {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        self.queue.chat(system_prompt, prompt, self.priority).await
    }
}
