use super::common::*;
use crate::access::{Authorization, Caller, Role, UserId};
use crate::workflows::applications::authorization::{
    authorize_application, authorize_installation, authorize_submission, ApplicationAction,
    InstallationAction,
};

#[test]
fn only_citizens_file_applications() {
    assert!(authorize_submission(&citizen()).is_allowed());
    for caller in [agent(), admin(), Caller::new("root", Role::SuperAdmin)] {
        assert!(
            !authorize_submission(&caller).is_allowed(),
            "{:?} must not file",
            caller.role
        );
    }
}

#[test]
fn citizens_read_only_their_own_applications() {
    let (service, _, _) = build_service();
    let record = submitted(&service);

    assert_eq!(
        authorize_application(&citizen(), ApplicationAction::Read, &record),
        Authorization::Allowed
    );
    assert!(matches!(
        authorize_application(&neighbour(), ApplicationAction::Read, &record),
        Authorization::Forbidden(_)
    ));
    assert!(matches!(
        authorize_application(&citizen(), ApplicationAction::Review, &record),
        Authorization::Forbidden(_)
    ));
}

#[test]
fn agents_read_whatever_they_may_review() {
    let (service, _, _) = build_service();
    let record = submitted(&service);

    for action in [ApplicationAction::Read, ApplicationAction::Review] {
        assert!(authorize_application(&agent(), action, &record).is_allowed());
        assert!(authorize_application(&other_agent(), action, &record).is_allowed());
    }
    assert!(
        !authorize_application(&agent(), ApplicationAction::AssignAgent, &record).is_allowed()
    );

    let mut assigned = record.clone();
    assigned.assigned_agent_id = Some(UserId(AGENT_ID.to_string()));
    assert!(authorize_application(&agent(), ApplicationAction::Read, &assigned).is_allowed());
    for action in [ApplicationAction::Read, ApplicationAction::Review] {
        assert!(!authorize_application(&other_agent(), action, &assigned).is_allowed());
    }
}

#[test]
fn administrators_are_unrestricted() {
    let (service, _, _) = build_service();
    let (application, installation) = scheduled(&service);
    let superadmin = Caller::new("root", Role::SuperAdmin);

    for caller in [admin(), superadmin] {
        for action in [
            ApplicationAction::Read,
            ApplicationAction::Review,
            ApplicationAction::AssignAgent,
        ] {
            assert!(authorize_application(&caller, action, &application).is_allowed());
        }
        assert!(
            authorize_installation(&caller, InstallationAction::UpdateStatus, &installation)
                .is_allowed()
        );
    }
}

#[test]
fn installations_are_limited_to_their_installer() {
    let (service, _, _) = build_service();
    let (_, installation) = scheduled(&service);

    assert!(
        authorize_installation(&agent(), InstallationAction::UpdateStatus, &installation)
            .is_allowed()
    );
    match authorize_installation(&other_agent(), InstallationAction::Read, &installation) {
        Authorization::Forbidden(reason) => assert!(reason.contains("agent-sunil")),
        Authorization::Allowed => panic!("unassigned agent must not read installation"),
    }
    assert!(
        !authorize_installation(&citizen(), InstallationAction::UpdateStatus, &installation)
            .is_allowed()
    );
}
