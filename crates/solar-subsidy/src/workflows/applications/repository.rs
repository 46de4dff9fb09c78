use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::access::UserId;

use super::domain::{
    AgentProfile, ApplicantDetails, ApplicationId, ApplicationStatus, InstallationId,
    InstallationStatus, PropertyDetails, Scheme, SchemeId,
};

/// Persisted application row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub application_number: String,
    pub user_id: UserId,
    pub scheme_id: SchemeId,
    pub applicant: ApplicantDetails,
    pub property: PropertyDetails,
    pub requested_capacity_kw: f64,
    pub status: ApplicationStatus,
    pub assigned_agent_id: Option<UserId>,
    pub installation_id: Option<InstallationId>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted installation row; at most one per application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub id: InstallationId,
    pub application_id: ApplicationId,
    pub installer_id: UserId,
    pub status: InstallationStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub actual_capacity_kw: Option<f64>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence collaborator for the lifecycle service.
///
/// Every write carries the status the caller read. Implementations must refuse the write with
/// [`RepositoryError::StaleStatus`] when the stored status differs, and must apply paired
/// writes (application plus installation) together or not at all.
pub trait LifecycleStore: Send + Sync {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn update_application(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError>;

    /// Moves the application to `scheduled` and stores its new installation.
    fn schedule_installation(
        &self,
        application: ApplicationRecord,
        expected: ApplicationStatus,
        installation: InstallationRecord,
    ) -> Result<(ApplicationRecord, InstallationRecord), RepositoryError>;
    fn fetch_installation(
        &self,
        id: &InstallationId,
    ) -> Result<Option<InstallationRecord>, RepositoryError>;
    /// Stores installation progress together with the mirrored application status.
    fn update_installation(
        &self,
        installation: InstallationRecord,
        expected: InstallationStatus,
        application: ApplicationRecord,
        application_expected: ApplicationStatus,
    ) -> Result<(InstallationRecord, ApplicationRecord), RepositoryError>;

    fn insert_scheme(&self, scheme: Scheme) -> Result<Scheme, RepositoryError>;
    fn fetch_scheme(&self, id: &SchemeId) -> Result<Option<Scheme>, RepositoryError>;
    fn list_schemes(&self) -> Result<Vec<Scheme>, RepositoryError>;

    fn fetch_agent(&self, id: &UserId) -> Result<Option<AgentProfile>, RepositoryError>;

    /// Reserves the next number in `sequence`. Numbers are never reissued and always exceed
    /// the numeric suffix of every identifier already stored, seeded rows included.
    fn next_sequence(&self, sequence: Sequence) -> Result<u64, RepositoryError>;
}

/// Counters behind generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sequence {
    Application,
    Installation,
    Scheme,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status changed concurrently (expected {expected}, found {found})")]
    StaleStatus {
        expected: &'static str,
        found: &'static str,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (e-mail, SMS, in-app inbox).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Notification payload emitted after each successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub recipient: UserId,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
