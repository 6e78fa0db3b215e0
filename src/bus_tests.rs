//! Unit tests for the EventBus - workflow progress pub/sub.

#[cfg(test)]
mod bus_tests {
    use crate::bus::EventBus;
    use crate::events::{ExecutionReport, IterationSummary, WorkflowEvent};
    use crate::models::{Recommendation, TradeDecision};
    use chrono::Utc;

    #[tokio::test]
    async fn test_eventbus_publish_subscribe() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let result = bus.publish(WorkflowEvent::IterationStarted {
            iteration: 1,
            at: Utc::now(),
        });
        assert_eq!(result.unwrap(), 1);

        match rx.recv().await {
            Ok(WorkflowEvent::IterationStarted { iteration, .. }) => assert_eq!(iteration, 1),
            other => panic!("Expected IterationStarted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_eventbus_multiple_subscribers() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(WorkflowEvent::Decision {
            symbol: "WIF".to_string(),
            decision: TradeDecision {
                recommendation: Recommendation::Buy,
                confidence: 82.0,
                reasoning: "volume".to_string(),
                risks: vec![],
                opportunities: vec![],
            },
        })
        .unwrap();

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await {
                Ok(WorkflowEvent::Decision { symbol, decision }) => {
                    assert_eq!(symbol, "WIF");
                    assert_eq!(decision.recommendation, Recommendation::Buy);
                }
                other => panic!("Expected Decision, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_eventbus_execution_report() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(WorkflowEvent::Execution(ExecutionReport {
            symbol: "BONK".to_string(),
            action: Recommendation::Sell,
            success: true,
            amount: Some(1000.0),
            signature: Some("sig".to_string()),
            error: None,
        }))
        .unwrap();

        if let Ok(WorkflowEvent::Execution(report)) = rx.recv().await {
            assert_eq!(report.symbol, "BONK");
            assert_eq!(report.action, Recommendation::Sell);
            assert_eq!(report.amount, Some(1000.0));
        } else {
            panic!("Expected Execution event");
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        let event = WorkflowEvent::IterationCompleted {
            iteration: 3,
            summary: IterationSummary::default(),
        };
        assert!(bus.publish(event.clone()).is_err());
        // emit swallows the missing-receiver error
        bus.emit(event);
    }

    #[tokio::test]
    async fn test_eventbus_capacity() {
        let bus = EventBus::new(5);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.emit(WorkflowEvent::IterationFailed {
                iteration: i,
                error: "boom".to_string(),
            });
        }
        // Slow receivers lag instead of blocking publishers
        assert!(rx.recv().await.is_err());
    }
}
