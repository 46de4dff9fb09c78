use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::access::{Caller, Role, UserId};
use crate::workflows::applications::domain::{
    AgentAssignment, AgentProfile, ApplicantDetails, ApplicationId, ApplicationStatus,
    ApplicationSubmission, InstallationId, InstallationStatus, PropertyDetails, Scheme, SchemeId,
};
use crate::workflows::applications::repository::{
    ApplicationRecord, InstallationRecord, LifecycleStore, Notification, NotificationError,
    NotificationPublisher, RepositoryError, Sequence,
};
use crate::workflows::applications::{ApplicationLifecycleService, InMemoryLifecycleStore};

pub(super) const AGENT_ID: &str = "agent-ravi";

pub(super) fn rooftop_scheme() -> Scheme {
    Scheme {
        id: SchemeId("SCH-ROOF".to_string()),
        name: "Rooftop Solar Programme Phase II".to_string(),
        subsidy_percentage: 40.0,
        max_subsidy_amount: 78_000.0,
        min_capacity_kw: 1.0,
        max_capacity_kw: 10.0,
        active: true,
    }
}

pub(super) fn retired_scheme() -> Scheme {
    Scheme {
        id: SchemeId("SCH-OLD".to_string()),
        name: "Net Metering Pilot".to_string(),
        subsidy_percentage: 30.0,
        max_subsidy_amount: 50_000.0,
        min_capacity_kw: 1.0,
        max_capacity_kw: 3.0,
        active: false,
    }
}

pub(super) fn field_agent() -> AgentProfile {
    AgentProfile {
        id: UserId(AGENT_ID.to_string()),
        name: "Ravi Patel".to_string(),
        region: "Gujarat".to_string(),
        active: true,
    }
}

pub(super) fn citizen() -> Caller {
    Caller::new("citizen-asha", Role::User)
}

pub(super) fn neighbour() -> Caller {
    Caller::new("citizen-vikram", Role::User)
}

pub(super) fn admin() -> Caller {
    Caller::new("admin-meera", Role::Admin)
}

pub(super) fn agent() -> Caller {
    Caller::new(AGENT_ID, Role::Agent)
}

pub(super) fn other_agent() -> Caller {
    Caller::new("agent-sunil", Role::Agent)
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        scheme_id: rooftop_scheme().id,
        applicant: ApplicantDetails {
            full_name: "Asha Mehta".to_string(),
            phone: "+91-98250-00000".to_string(),
            email: Some("asha@example.in".to_string()),
        },
        property: PropertyDetails {
            address: "14 Sabarmati Riverfront Road".to_string(),
            district: "Ahmedabad".to_string(),
            state: "Gujarat".to_string(),
            roof_area_sqft: 400.0,
            monthly_bill: 2400.0,
            consumer_number: Some("UGVCL-778812".to_string()),
        },
        requested_capacity_kw: 3.0,
    }
}

pub(super) fn store() -> InMemoryLifecycleStore {
    InMemoryLifecycleStore::with_reference_data(
        vec![rooftop_scheme(), retired_scheme()],
        vec![field_agent()],
    )
}

pub(super) type TestService = ApplicationLifecycleService<InMemoryLifecycleStore, MemoryNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemoryLifecycleStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(store());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ApplicationLifecycleService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn submitted(service: &TestService) -> ApplicationRecord {
    service
        .submit(&citizen(), submission())
        .expect("submission succeeds")
}

pub(super) fn approved(service: &TestService) -> ApplicationRecord {
    let record = submitted(service);
    service
        .approve(&admin(), &record.id)
        .expect("approval succeeds")
}

pub(super) fn scheduled(service: &TestService) -> (ApplicationRecord, InstallationRecord) {
    let record = approved(service);
    service
        .assign_agent(
            &admin(),
            &record.id,
            AgentAssignment {
                agent_id: UserId(AGENT_ID.to_string()),
                scheduled_date: None,
            },
        )
        .expect("assignment succeeds")
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn templates(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .map(|event| event.template.clone())
            .collect()
    }

    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl NotificationPublisher for FailingNotifier {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl LifecycleStore for UnavailableStore {
    fn insert_application(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_application(
        &self,
        _record: ApplicationRecord,
        _expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn schedule_installation(
        &self,
        _application: ApplicationRecord,
        _expected: ApplicationStatus,
        _installation: InstallationRecord,
    ) -> Result<(ApplicationRecord, InstallationRecord), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_installation(
        &self,
        _id: &InstallationId,
    ) -> Result<Option<InstallationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_installation(
        &self,
        _installation: InstallationRecord,
        _expected: InstallationStatus,
        _application: ApplicationRecord,
        _application_expected: ApplicationStatus,
    ) -> Result<(InstallationRecord, ApplicationRecord), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_scheme(&self, _scheme: Scheme) -> Result<Scheme, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_scheme(&self, _id: &SchemeId) -> Result<Option<Scheme>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_schemes(&self) -> Result<Vec<Scheme>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_agent(&self, _id: &UserId) -> Result<Option<AgentProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn next_sequence(&self, _sequence: Sequence) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
