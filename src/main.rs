use rust_autotrader::config::AppConfig;
use rust_autotrader::data::cookie::CookieSearchApi;
use rust_autotrader::data::dexscreener::{DexScreenerClient, MarketDataProvider};
use rust_autotrader::data::discovery::build_sources;
use rust_autotrader::data::portfolio::{MoralisPortfolioClient, PortfolioService};
use rust_autotrader::data::signal::SignalClient;
use rust_autotrader::exchange::build_venues;
use rust_autotrader::llm::{LLMClient, LLMQueue, Priority};
use rust_autotrader::services::analysis::TokenAnalyzer;
use rust_autotrader::services::decision::DecisionMaker;
use rust_autotrader::services::execution::ExecutionEngine;
use rust_autotrader::services::notification::TradeAnnouncer;
use rust_autotrader::{EventBus, TradingWorkflow, WorkflowEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Logs workflow progress until the bus closes.
fn spawn_event_logger(bus: &EventBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(WorkflowEvent::Execution(report)) if !report.success => {
                    warn!(
                        "[EVENTS] {} {} failed: {}",
                        report.action,
                        report.symbol,
                        report.error.unwrap_or_default()
                    );
                }
                Ok(WorkflowEvent::IterationFailed { iteration, error }) => {
                    warn!("[EVENTS] Iteration {} failed: {}", iteration, error);
                }
                Ok(event) => tracing::debug!("[EVENTS] {:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("[EVENTS] Event logger lagged by {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Autotrader...");

    let config = AppConfig::load()?;
    if config.dry_run {
        info!("🧪 Dry run enabled - trades will be simulated");
    }

    // Reasoning capability, required for every decision
    let llm_client = LLMClient::from_config(&config.llm)?;
    info!(
        "📬 Initializing LLM Queue (model: {}, max concurrent: {}, size: {})...",
        llm_client.model, config.llm.max_concurrent, config.llm.queue_size
    );
    let llm_queue = LLMQueue::new(Arc::new(llm_client), config.llm.max_concurrent, config.llm.queue_size);

    // Data clients
    let market: Arc<dyn MarketDataProvider> = Arc::new(DexScreenerClient::new(&config.market_data));
    let signals = match CookieSearchApi::new(&config.social) {
        Ok(api) => Some(SignalClient::new(Arc::new(api), config.social.clone())),
        Err(e) => {
            warn!("Social signals disabled: {}", e);
            None
        }
    };
    let portfolio = match MoralisPortfolioClient::new(&config.portfolio) {
        Ok(client) => Some(PortfolioService::new(
            Arc::new(client),
            Duration::from_secs(config.portfolio.cache_ttl_secs),
        )),
        Err(e) => {
            warn!("Portfolio disabled, held tokens will not be analyzed: {}", e);
            None
        }
    };
    let sources = build_sources(
        &config.discovery,
        config.experienced_buyers_key(),
        market.clone(),
        config.workflow.trending_max_results,
    );

    // Execution
    let venues = build_venues(&config);
    if venues.is_empty() && !config.dry_run {
        warn!("No trading venue configured, every trade will fail");
    }
    let engine = ExecutionEngine::new(venues, config.execution.clone(), config.dry_run);

    let bus = EventBus::new(1000);
    spawn_event_logger(&bus);

    let mut workflow = TradingWorkflow::new(
        TokenAnalyzer::new(market, signals, config.workflow.social_results_per_token),
        DecisionMaker::new(Arc::new(llm_queue.handle(Priority::High))),
        engine,
        bus,
        config.workflow.clone(),
    )
    .with_sources(sources);
    if let Some(portfolio) = portfolio {
        workflow = workflow.with_portfolio(portfolio);
    }
    if let Some(announcer) = TradeAnnouncer::from_config(&config.notification, Arc::new(llm_queue.handle(Priority::Normal))) {
        workflow = workflow.with_announcer(announcer);
    }

    let workflow = Arc::new(workflow);
    let handle = workflow.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, finishing current iteration...");
    workflow.stop();
    if let Err(e) = handle.await {
        error!("Workflow task ended abnormally: {}", e);
    }

    Ok(())
}
