//! Forwarding cycle summaries to an external reporting service.
//!
//! The engine knows nothing about the service's transport: it hands over a
//! report name and an opaque payload and passes the boolean answer back to
//! the caller unchanged. Nothing here retries.

use crate::task::{CycleReport, ManagerSummary};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

/// External service that accepts named reports
#[async_trait]
pub trait ReportingService: Send + Sync {
    async fn send_report(&self, name: &str, payload: &str) -> bool;
}

/// Payload forwarded after a cycle
#[derive(Debug, Serialize)]
pub struct CyclePayload<'a> {
    pub summary: &'a ManagerSummary,
    pub cycle: &'a CycleReport,
}

/// Adapts cycle outcomes to a [`ReportingService`]
pub struct ReportForwarder<S> {
    service: S,
    report_name: String,
}

impl<S: ReportingService> ReportForwarder<S> {
    pub fn new(service: S, report_name: impl Into<String>) -> Self {
        Self {
            service,
            report_name: report_name.into(),
        }
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Serialize the summary and cycle report to JSON and deliver it once
    pub async fn forward(
        &self,
        summary: &ManagerSummary,
        cycle: &CycleReport,
    ) -> serde_json::Result<bool> {
        let payload = serde_json::to_string(&CyclePayload { summary, cycle })?;
        let delivered = self.service.send_report(&self.report_name, &payload).await;

        if delivered {
            info!("Report '{}' delivered", self.report_name);
        } else {
            warn!("Report '{}' was rejected", self.report_name);
        }
        Ok(delivered)
    }
}

/// Console-backed daily report service; rejects report names containing whitespace
#[derive(Debug, Default)]
pub struct ConsoleReportingService;

#[async_trait]
impl ReportingService for ConsoleReportingService {
    async fn send_report(&self, name: &str, payload: &str) -> bool {
        info!(
            "[REPORTING] Sending report: {} ({} bytes)",
            name,
            payload.len()
        );
        !name.chars().any(char::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ListenerCategory, StrategyKind, TaskManager, TaskPriority, TaskSpec};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        received: Mutex<Vec<(String, String)>>,
        accept: bool,
    }

    #[async_trait]
    impl ReportingService for RecordingService {
        async fn send_report(&self, name: &str, payload: &str) -> bool {
            self.received
                .lock()
                .unwrap()
                .push((name.to_string(), payload.to_string()));
            self.accept
        }
    }

    async fn completed_cycle() -> (ManagerSummary, CycleReport) {
        let mut manager = TaskManager::new();
        manager
            .add_task(TaskSpec::new("Review email", "Inbox zero", TaskPriority::Medium))
            .unwrap();
        manager
            .add_task(
                TaskSpec::new("Prepare slides", "Weekly sync", TaskPriority::High)
                    .with_duration(120),
            )
            .unwrap();
        manager.set_strategy_kind(StrategyKind::Sequential).unwrap();
        let report = manager.run().await.unwrap();
        (manager.summary(), report)
    }

    #[tokio::test]
    async fn test_forward_sends_json_payload_once() {
        let service = RecordingService {
            accept: true,
            ..Default::default()
        };
        let (summary, cycle) = completed_cycle().await;

        let forwarder = ReportForwarder::new(service, "task_summary");
        assert!(forwarder.forward(&summary, &cycle).await.unwrap());

        let received = forwarder.service().received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "task_summary");

        let payload: serde_json::Value = serde_json::from_str(&received[0].1).unwrap();
        assert_eq!(payload["summary"]["task_count"], 2);
        assert_eq!(payload["summary"]["total_estimated_minutes"], 150);
        assert_eq!(payload["cycle"]["completed_count"], 2);
        assert_eq!(payload["cycle"]["strategy"], "sequential");
    }

    #[tokio::test]
    async fn test_forward_passes_rejection_through_without_retry() {
        let service = RecordingService::default();
        let (summary, cycle) = completed_cycle().await;

        let forwarder = ReportForwarder::new(service, "task_summary");
        assert!(!forwarder.forward(&summary, &cycle).await.unwrap());
        assert_eq!(forwarder.service().received.lock().unwrap().len(), 1);
        assert!(!summary.has_category(ListenerCategory::Logging));
    }

    #[tokio::test]
    async fn test_console_service_rejects_names_with_spaces() {
        let service = ConsoleReportingService;
        assert!(service.send_report("task_summary", "{}").await);
        assert!(!service.send_report("task summary", "{}").await);
    }
}
