//! Integration tests for the subsidy application lifecycle.
//!
//! Scenarios drive the public service facade and HTTP router end to end: a citizen files,
//! an administrator reviews and assigns, and the field agent reports progress.

mod common {
    use std::sync::{Arc, Mutex};

    use solar_subsidy::access::{Caller, Role, UserId};
    use solar_subsidy::workflows::applications::{
        AgentProfile, ApplicantDetails, ApplicationLifecycleService, ApplicationSubmission,
        InMemoryLifecycleStore, Notification, NotificationError, NotificationPublisher,
        PropertyDetails, Scheme, SchemeId,
    };

    pub(super) fn scheme() -> Scheme {
        Scheme {
            id: SchemeId("SCH-RTS".to_string()),
            name: "Residential Rooftop Solar".to_string(),
            subsidy_percentage: 40.0,
            max_subsidy_amount: 78_000.0,
            min_capacity_kw: 1.0,
            max_capacity_kw: 10.0,
            active: true,
        }
    }

    pub(super) fn installer() -> AgentProfile {
        AgentProfile {
            id: UserId("agent-farah".to_string()),
            name: "Farah Khan".to_string(),
            region: "Maharashtra".to_string(),
            active: true,
        }
    }

    pub(super) fn citizen() -> Caller {
        Caller::new("citizen-nikhil", Role::User)
    }

    pub(super) fn stranger() -> Caller {
        Caller::new("citizen-priya", Role::User)
    }

    pub(super) fn admin() -> Caller {
        Caller::new("admin-dev", Role::Admin)
    }

    pub(super) fn agent() -> Caller {
        Caller::new("agent-farah", Role::Agent)
    }

    pub(super) fn submission() -> ApplicationSubmission {
        ApplicationSubmission {
            scheme_id: scheme().id,
            applicant: ApplicantDetails {
                full_name: "Nikhil Joshi".to_string(),
                phone: "+91-98220-11111".to_string(),
                email: None,
            },
            property: PropertyDetails {
                address: "7 Koregaon Park Lane".to_string(),
                district: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                roof_area_sqft: 350.0,
                monthly_bill: 3200.0,
                consumer_number: None,
            },
            requested_capacity_kw: 2.5,
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct RecordingNotifier {
        events: Arc<Mutex<Vec<Notification>>>,
    }

    impl RecordingNotifier {
        pub(super) fn templates(&self) -> Vec<String> {
            self.events
                .lock()
                .expect("notifier mutex poisoned")
                .iter()
                .map(|event| event.template.clone())
                .collect()
        }
    }

    impl NotificationPublisher for RecordingNotifier {
        fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
            self.events
                .lock()
                .expect("notifier mutex poisoned")
                .push(notification);
            Ok(())
        }
    }

    pub(super) type Service = ApplicationLifecycleService<InMemoryLifecycleStore, RecordingNotifier>;

    pub(super) fn build_service() -> (Arc<Service>, RecordingNotifier) {
        let store = Arc::new(InMemoryLifecycleStore::with_reference_data(
            vec![scheme()],
            vec![installer()],
        ));
        let notifier = RecordingNotifier::default();
        let service = Arc::new(ApplicationLifecycleService::new(
            store,
            Arc::new(notifier.clone()),
        ));
        (service, notifier)
    }
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::{json, Value};
use solar_subsidy::access::{USER_ID_HEADER, USER_ROLE_HEADER};
use solar_subsidy::workflows::applications::{
    application_router, AgentAssignment, ApplicationServiceError, ApplicationStatus,
    InstallationStatus, InstallationUpdate,
};
use tower::ServiceExt;

#[test]
fn application_moves_from_submission_to_installation() {
    let (service, notifier) = build_service();

    let record = service
        .submit(&citizen(), submission())
        .expect("citizen submits");
    assert_eq!(record.status, ApplicationStatus::Pending);

    let approved = service.approve(&admin(), &record.id).expect("admin approves");
    assert_eq!(approved.reviewed_by, Some(admin().id));

    let (scheduled, installation) = service
        .assign_agent(
            &admin(),
            &record.id,
            AgentAssignment {
                agent_id: installer().id,
                scheduled_date: None,
            },
        )
        .expect("admin assigns");
    assert_eq!(scheduled.status, ApplicationStatus::Scheduled);

    service
        .update_installation_status(
            &agent(),
            &installation.id,
            InstallationUpdate::to(InstallationStatus::InProgress),
        )
        .expect("agent starts");
    let (completed, installed) = service
        .update_installation_status(
            &agent(),
            &installation.id,
            InstallationUpdate {
                status: InstallationStatus::Completed,
                actual_capacity_kw: Some(2.4),
                notes: None,
            },
        )
        .expect("agent completes");

    assert_eq!(completed.actual_capacity_kw, Some(2.4));
    assert_eq!(installed.status, ApplicationStatus::Installed);
    assert_eq!(
        notifier.templates(),
        vec![
            "application_submitted",
            "application_approved",
            "installation_scheduled",
            "installation_assigned",
            "installation_in_progress",
            "installation_completed",
        ]
    );

    let owner_view = service.get(&citizen(), &record.id).expect("owner reads");
    assert_eq!(owner_view.status, ApplicationStatus::Installed);
}

#[test]
fn pending_application_cannot_jump_to_installed() {
    let (service, _) = build_service();
    let record = service
        .submit(&citizen(), submission())
        .expect("citizen submits");

    let error = ApplicationStatus::Pending
        .transition_to(ApplicationStatus::Installed)
        .expect_err("skipping is illegal");
    assert_eq!(error.to, "installed");

    // there is no installation to progress before assignment
    let untouched = service.get(&admin(), &record.id).expect("admin reads");
    assert_eq!(untouched.status, ApplicationStatus::Pending);
}

#[test]
fn strangers_cannot_see_applications() {
    let (service, _) = build_service();
    let record = service
        .submit(&citizen(), submission())
        .expect("citizen submits");

    assert!(matches!(
        service.get(&stranger(), &record.id),
        Err(ApplicationServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn http_round_trip_over_router() {
    let (service, _) = build_service();
    let router = application_router(service.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/applications")
                .header(USER_ID_HEADER, "citizen-nikhil")
                .header(USER_ROLE_HEADER, "user")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&submission()).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let created: Value = serde_json::from_slice(&body).expect("json payload");
    let id = created["id"].as_str().expect("id present").to_string();

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/applications/{id}/reject"))
                .header(USER_ID_HEADER, "agent-farah")
                .header(USER_ROLE_HEADER, "agent")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "reason": "Roof not structurally sound" }).to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::post(format!("/api/v1/applications/{id}/approve"))
                .header(USER_ID_HEADER, "admin-dev")
                .header(USER_ROLE_HEADER, "admin")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
