//! Transition tables for applications and their installations.
//!
//! A requested status that is not listed as a successor of the current status is refused;
//! nothing is clamped to a nearby legal state. Repeating a transition (approving an approved
//! application, rejecting a rejected one) is refused the same way.

use super::domain::{ApplicationStatus, InstallationStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

impl ApplicationStatus {
    pub const fn successors(self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Pending => {
                &[ApplicationStatus::Approved, ApplicationStatus::Rejected]
            }
            ApplicationStatus::Approved => {
                &[ApplicationStatus::Scheduled, ApplicationStatus::Rejected]
            }
            ApplicationStatus::Scheduled => {
                &[ApplicationStatus::InProgress, ApplicationStatus::Cancelled]
            }
            ApplicationStatus::InProgress => {
                &[ApplicationStatus::Installed, ApplicationStatus::Cancelled]
            }
            ApplicationStatus::Rejected
            | ApplicationStatus::Installed
            | ApplicationStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    pub fn transition_to(self, next: ApplicationStatus) -> Result<ApplicationStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                entity: "application",
                from: self.label(),
                to: next.label(),
            })
        }
    }
}

impl InstallationStatus {
    pub const fn successors(self) -> &'static [InstallationStatus] {
        match self {
            InstallationStatus::Scheduled => {
                &[InstallationStatus::InProgress, InstallationStatus::Cancelled]
            }
            InstallationStatus::InProgress => {
                &[InstallationStatus::Completed, InstallationStatus::Cancelled]
            }
            InstallationStatus::Completed | InstallationStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: InstallationStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn transition_to(
        self,
        next: InstallationStatus,
    ) -> Result<InstallationStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                entity: "installation",
                from: self.label(),
                to: next.label(),
            })
        }
    }

    /// Application status that tracks this installation status.
    pub const fn application_status(self) -> ApplicationStatus {
        match self {
            InstallationStatus::Scheduled => ApplicationStatus::Scheduled,
            InstallationStatus::InProgress => ApplicationStatus::InProgress,
            InstallationStatus::Completed => ApplicationStatus::Installed,
            InstallationStatus::Cancelled => ApplicationStatus::Cancelled,
        }
    }
}
