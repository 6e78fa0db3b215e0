//! Unit tests for workflow events.

#[cfg(test)]
mod events_tests {
    use crate::events::*;
    use crate::models::Recommendation;
    use chrono::Utc;

    #[test]
    fn test_iteration_numbers() {
        let started = WorkflowEvent::IterationStarted {
            iteration: 7,
            at: Utc::now(),
        };
        let failed = WorkflowEvent::IterationFailed {
            iteration: 8,
            error: "timeout".to_string(),
        };
        let execution = WorkflowEvent::Execution(ExecutionReport {
            symbol: "WIF".to_string(),
            action: Recommendation::Hold,
            success: true,
            amount: None,
            signature: None,
            error: Some("Confidence too low".to_string()),
        });

        assert_eq!(started.iteration(), Some(7));
        assert_eq!(failed.iteration(), Some(8));
        assert_eq!(execution.iteration(), None);
    }

    #[test]
    fn test_summary_default_is_empty() {
        let summary = IterationSummary::default();
        assert_eq!(summary.candidates, 0);
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.announcements, 0);
    }
}
