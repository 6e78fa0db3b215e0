use chrono::{DateTime, Utc};

use crate::models::{ExecutionResult, Recommendation, TradeDecision};

/// Summary of one execution attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionReport {
    pub symbol: String,
    pub action: Recommendation,
    pub success: bool,
    pub amount: Option<f64>,
    pub signature: Option<String>,
    pub error: Option<String>,
}

/// Counters for a finished iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IterationSummary {
    pub candidates: usize,
    pub decisions: usize,
    pub executions: usize,
    pub failures: usize,
    pub announcements: usize,
}

// Global Event Enum
#[derive(Clone, Debug)]
pub enum WorkflowEvent {
    IterationStarted {
        iteration: u64,
        at: DateTime<Utc>,
    },
    Decision {
        symbol: String,
        decision: TradeDecision,
    },
    Execution(ExecutionReport),
    IterationCompleted {
        iteration: u64,
        summary: IterationSummary,
    },
    IterationFailed {
        iteration: u64,
        error: String,
    },
}

impl WorkflowEvent {
    pub fn iteration(&self) -> Option<u64> {
        match self {
            WorkflowEvent::IterationStarted { iteration, .. }
            | WorkflowEvent::IterationCompleted { iteration, .. }
            | WorkflowEvent::IterationFailed { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}

impl From<&ExecutionResult> for ExecutionReport {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            symbol: result.token.symbol.clone(),
            action: result.action,
            success: result.success,
            amount: result.amount,
            signature: result.signature.clone(),
            error: result.error.clone(),
        }
    }
}
