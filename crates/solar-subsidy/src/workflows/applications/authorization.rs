use crate::access::{Authorization, Caller, Role};

use super::repository::{ApplicationRecord, InstallationRecord};

/// Operations gated per application record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationAction {
    Read,
    Review,
    AssignAgent,
}

impl ApplicationAction {
    const fn label(self) -> &'static str {
        match self {
            ApplicationAction::Read => "read",
            ApplicationAction::Review => "review",
            ApplicationAction::AssignAgent => "assign an agent to",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationAction {
    Read,
    UpdateStatus,
}

/// Only citizens file applications, and only for themselves.
pub fn authorize_submission(caller: &Caller) -> Authorization {
    match caller.role {
        Role::User => Authorization::Allowed,
        other => Authorization::forbid(format!(
            "{} accounts cannot file applications",
            other.label()
        )),
    }
}

pub fn authorize_application(
    caller: &Caller,
    action: ApplicationAction,
    record: &ApplicationRecord,
) -> Authorization {
    if caller.role.is_administrative() {
        return Authorization::Allowed;
    }

    match (caller.role, action) {
        (Role::User, ApplicationAction::Read) if caller.is(&record.user_id) => {
            Authorization::Allowed
        }
        // Agents see and review anything that is not already another agent's assignment.
        (Role::Agent, ApplicationAction::Read | ApplicationAction::Review)
            if record.assigned_agent_id.is_none() || is_assignee(caller, record) =>
        {
            Authorization::Allowed
        }
        (role, action) => Authorization::forbid(format!(
            "{} {} may not {} application {}",
            role.label(),
            caller.id,
            action.label(),
            record.id
        )),
    }
}

pub fn authorize_installation(
    caller: &Caller,
    action: InstallationAction,
    record: &InstallationRecord,
) -> Authorization {
    if caller.role.is_administrative() {
        return Authorization::Allowed;
    }

    if caller.role == Role::Agent && caller.is(&record.installer_id) {
        return Authorization::Allowed;
    }

    let verb = match action {
        InstallationAction::Read => "read",
        InstallationAction::UpdateStatus => "update",
    };
    Authorization::forbid(format!(
        "{} {} may not {verb} installation {}",
        caller.role.label(),
        caller.id,
        record.id
    ))
}

fn is_assignee(caller: &Caller, record: &ApplicationRecord) -> bool {
    record
        .assigned_agent_id
        .as_ref()
        .is_some_and(|agent| caller.is(agent))
}
