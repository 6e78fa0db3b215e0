//! The periodic discover → analyze → decide → execute → notify loop.

use chrono::Utc;
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bus::EventBus;
use crate::config::WorkflowConfig;
use crate::data::discovery::TokenSource;
use crate::data::portfolio::PortfolioService;
use crate::data::types::Token;
use crate::error::TradingError;
use crate::events::{ExecutionReport, IterationSummary, WorkflowEvent};
use crate::models::{ExecutionResult, Recommendation, TokenAnalysis, TradeDecision};
use crate::services::analysis::TokenAnalyzer;
use crate::services::decision::DecisionMaker;
use crate::services::execution::ExecutionEngine;
use crate::services::notification::TradeAnnouncer;

/// Case-insensitive symbol dedup. Held tokens come first, so they win.
pub fn deduplicate_tokens(held: Vec<Token>, discovered: Vec<Token>) -> Vec<Token> {
    let mut seen = HashSet::new();
    held.into_iter()
        .chain(discovered)
        .filter(|token| seen.insert(token.dedup_key()))
        .collect()
}

pub struct TradingWorkflow {
    sources: Vec<Arc<dyn TokenSource>>,
    portfolio: Option<PortfolioService>,
    analyzer: TokenAnalyzer,
    decisions: DecisionMaker,
    execution: ExecutionEngine,
    announcer: Option<TradeAnnouncer>,
    bus: EventBus,
    config: WorkflowConfig,
    running: AtomicBool,
    stop_requested: AtomicBool,
    wake: Notify,
    iteration_lock: Mutex<()>,
    iterations: AtomicU64,
}

impl TradingWorkflow {
    pub fn new(
        analyzer: TokenAnalyzer,
        decisions: DecisionMaker,
        execution: ExecutionEngine,
        bus: EventBus,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            sources: Vec::new(),
            portfolio: None,
            analyzer,
            decisions,
            execution,
            announcer: None,
            bus,
            config,
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            wake: Notify::new(),
            iteration_lock: Mutex::new(()),
            iterations: AtomicU64::new(0),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Arc<dyn TokenSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_portfolio(mut self, portfolio: PortfolioService) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn with_announcer(mut self, announcer: TradeAnnouncer) -> Self {
        self.announcer = Some(announcer);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    /// Spawn the loop on the runtime.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        info!("🚀 [WORKFLOW] Starting trading workflow");
        let workflow = Arc::clone(self);
        tokio::spawn(async move { workflow.run().await })
    }

    /// Ends the loop after the in-flight iteration. Wakes a pending sleep.
    pub fn stop(&self) {
        info!("🛑 [WORKFLOW] Stopping trading workflow");
        self.stop_requested.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Loops until stopped. A second concurrent call returns immediately.
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            info!("[WORKFLOW] Already processing trading analysis, skipping");
            return;
        }

        let interval = Duration::from_secs(self.config.analysis_interval_secs);
        let cooldown = Duration::from_secs(self.config.error_cooldown_secs);

        while !self.stop_requested.load(Ordering::SeqCst) {
            let pause = match self.run_iteration().await {
                Ok(summary) => {
                    info!(
                        "✅ [WORKFLOW] Iteration done: {} candidates, {} decisions, {} failures, {} announced",
                        summary.candidates, summary.decisions, summary.failures, summary.announcements
                    );
                    interval
                }
                Err(e) => {
                    error!("❌ [WORKFLOW] Error in trading analysis loop: {}", e);
                    cooldown
                }
            };

            if self.stop_requested.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = self.wake.notified() => {}
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("[WORKFLOW] Trading workflow stopped");
    }

    /// One full pass. Per-token failures are folded into the results; only the
    /// holdings lookup can fail the whole iteration.
    pub async fn run_iteration(&self) -> Result<IterationSummary, TradingError> {
        let _guard = self.iteration_lock.lock().await;
        let iteration = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
        self.bus.emit(WorkflowEvent::IterationStarted {
            iteration,
            at: Utc::now(),
        });

        match self.iterate().await {
            Ok(summary) => {
                self.bus.emit(WorkflowEvent::IterationCompleted {
                    iteration,
                    summary: summary.clone(),
                });
                Ok(summary)
            }
            Err(e) => {
                self.bus.emit(WorkflowEvent::IterationFailed {
                    iteration,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn iterate(&self) -> Result<IterationSummary, TradingError> {
        let tokens = self.fetch_candidates().await?;
        info!("🔍 [WORKFLOW] Analyzing {} unique tokens", tokens.len());
        let width = self.config.max_concurrency.max(1);

        // Futures are collected first so the spawned loop stays Send
        let analyses: Vec<TokenAnalysis> = stream::iter(
            tokens
                .iter()
                .map(|token| self.analyzer.analyze(token))
                .collect::<Vec<_>>(),
        )
        .buffered(width)
        .collect()
        .await;

        let decisions: Vec<Option<TradeDecision>> = stream::iter(
            tokens
                .iter()
                .zip(&analyses)
                .map(|(token, analysis)| self.decisions.decide(token, analysis))
                .collect::<Vec<_>>(),
        )
        .buffered(width)
        .collect()
        .await;

        for ((token, analysis), decision) in tokens.iter().zip(&analyses).zip(&decisions) {
            info!(
                "[WORKFLOW] {}: {} pairs, best price {:?}, {} social mentions, decision {:?} ({:?})",
                token.symbol,
                analysis.market.len(),
                analysis.market.first().and_then(|p| p.price_usd.clone()),
                analysis.social.len(),
                decision.as_ref().map(|d| d.recommendation),
                decision.as_ref().map(|d| d.confidence)
            );
            if let Some(decision) = decision {
                self.bus.emit(WorkflowEvent::Decision {
                    symbol: token.symbol.clone(),
                    decision: decision.clone(),
                });
            }
        }

        let results: Vec<ExecutionResult> = stream::iter(
            tokens
                .iter()
                .zip(&analyses)
                .zip(&decisions)
                .map(|((token, analysis), decision)| self.execute(token, decision.as_ref(), analysis))
                .collect::<Vec<_>>(),
        )
        .buffered(width)
        .collect()
        .await;

        for result in &results {
            self.bus.emit(WorkflowEvent::Execution(ExecutionReport::from(result)));
        }

        let announcements = match self.announcer.as_ref() {
            Some(announcer) => announcer.notify_successful_trades(&results).await,
            None => 0,
        };

        Ok(IterationSummary {
            candidates: tokens.len(),
            decisions: decisions.iter().filter(|d| d.is_some()).count(),
            executions: results.len(),
            failures: results.iter().filter(|r| !r.success).count(),
            announcements,
        })
    }

    async fn fetch_candidates(&self) -> Result<Vec<Token>, TradingError> {
        let held = async {
            match self.portfolio.as_ref() {
                Some(portfolio) => portfolio.try_held_tokens().await,
                None => Ok(Vec::new()),
            }
        };
        let discovered = join_all(self.sources.iter().map(|source| async move {
            let tokens = source.fetch_tokens().await;
            info!("[WORKFLOW] {} source returned {} tokens", source.name(), tokens.len());
            tokens
        }));

        let (held, discovered) = tokio::join!(held, discovered);
        let held = held?;
        Ok(deduplicate_tokens(held, discovered.into_iter().flatten().collect()))
    }

    async fn execute(&self, token: &Token, decision: Option<&TradeDecision>, analysis: &TokenAnalysis) -> ExecutionResult {
        match decision {
            Some(decision) => self.execution.execute(token, decision, &analysis.market).await,
            None => {
                warn!("[WORKFLOW] No trading decision for {}, skipping execution", token.symbol);
                ExecutionResult::failed(
                    Recommendation::Hold,
                    "No trading decision".to_string(),
                    token,
                    None,
                    &analysis.market,
                )
            }
        }
    }
}
