//! Subsidy application intake, review, agent assignment, and installation tracking.

pub mod authorization;
pub mod domain;
pub mod lifecycle;
mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use authorization::{ApplicationAction, InstallationAction};
pub use domain::{
    AgentAssignment, AgentProfile, ApplicantDetails, ApplicationFilter, ApplicationId,
    ApplicationStatus, ApplicationSubmission, InstallationId, InstallationStatus,
    InstallationUpdate, PropertyDetails, Scheme, SchemeDraft, SchemeId,
};
pub use lifecycle::TransitionError;
pub use memory::InMemoryLifecycleStore;
pub use repository::{
    ApplicationRecord, InstallationRecord, LifecycleStore, Notification, NotificationError,
    NotificationPublisher, RepositoryError, Sequence,
};
pub use router::{application_router, LifecycleView};
pub use service::{ApplicationLifecycleService, ApplicationServiceError, ApplicationStatistics};
