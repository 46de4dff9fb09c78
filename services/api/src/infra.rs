use metrics_exporter_prometheus::PrometheusHandle;
use solar_subsidy::access::UserId;
use solar_subsidy::workflows::applications::{
    AgentProfile, Notification, NotificationError, NotificationPublisher, Scheme, SchemeId,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Publishes notifications to the structured log and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotifier;

impl NotificationPublisher for LoggingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            recipient = %notification.recipient,
            application_id = %notification.application_id,
            "notification dispatched"
        );
        Ok(())
    }
}

pub(crate) fn seed_schemes() -> Vec<Scheme> {
    vec![
        Scheme {
            id: SchemeId("SCH-001".to_string()),
            name: "PM Surya Ghar Muft Bijli Yojana".to_string(),
            subsidy_percentage: 60.0,
            max_subsidy_amount: 78_000.0,
            min_capacity_kw: 1.0,
            max_capacity_kw: 10.0,
            active: true,
        },
        Scheme {
            id: SchemeId("SCH-002".to_string()),
            name: "Residential Welfare Association Rooftop".to_string(),
            subsidy_percentage: 40.0,
            max_subsidy_amount: 1_800_000.0,
            min_capacity_kw: 3.0,
            max_capacity_kw: 500.0,
            active: true,
        },
    ]
}

pub(crate) fn seed_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile {
            id: UserId("agent-001".to_string()),
            name: "Kiran Patel".to_string(),
            region: "Gujarat".to_string(),
            active: true,
        },
        AgentProfile {
            id: UserId("agent-002".to_string()),
            name: "Meera Iyer".to_string(),
            region: "Tamil Nadu".to_string(),
            active: true,
        },
    ]
}
