use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::access::{authorize_administration, Authorization, Caller, UserId};

use super::authorization::{
    authorize_application, authorize_installation, authorize_submission, ApplicationAction,
    InstallationAction,
};
use super::domain::{
    AgentAssignment, ApplicationFilter, ApplicationId, ApplicationStatus,
    ApplicationSubmission, InstallationId, InstallationStatus, InstallationUpdate, Scheme,
    SchemeDraft, SchemeId,
};
use super::lifecycle::TransitionError;
use super::repository::{
    ApplicationRecord, InstallationRecord, LifecycleStore, Notification, NotificationPublisher,
    RepositoryError, Sequence,
};

/// Service applying the lifecycle table and authorization matrix on top of the store.
///
/// Every operation resolves the entities it names first (`NotFound`), then checks the
/// caller (`Forbidden`), then validates the request and transition, and only then writes.
pub struct ApplicationLifecycleService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

/// Per-status totals for the administrator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStatistics {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl<S, N> ApplicationLifecycleService<S, N>
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
        }
    }

    /// File a new application for the calling citizen.
    pub fn submit(
        &self,
        caller: &Caller,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let scheme = self.scheme(&submission.scheme_id)?;
        ensure(authorize_submission(caller))?;
        validate_submission(&submission, &scheme)?;

        let sequence = self.store.next_sequence(Sequence::Application)?;
        let now = Utc::now();
        let record = ApplicationRecord {
            id: ApplicationId(format!("app-{sequence:06}")),
            application_number: format!("APP-{}-{sequence:06}", now.year()),
            user_id: caller.id.clone(),
            scheme_id: scheme.id,
            applicant: submission.applicant,
            property: submission.property,
            requested_capacity_kw: submission.requested_capacity_kw,
            status: ApplicationStatus::Pending,
            assigned_agent_id: None,
            installation_id: None,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            submitted_at: now,
            updated_at: now,
        };

        let stored = self.store.insert_application(record)?;
        info!(
            application_id = %stored.id,
            number = %stored.application_number,
            user = %caller.id,
            "application submitted"
        );
        self.notify("application_submitted", &stored.user_id, &stored, BTreeMap::new());
        Ok(stored)
    }

    pub fn get(
        &self,
        caller: &Caller,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self.application(id)?;
        ensure(authorize_application(caller, ApplicationAction::Read, &record))?;
        Ok(record)
    }

    /// Applications visible to the caller, oldest first.
    pub fn list(
        &self,
        caller: &Caller,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let mut records: Vec<_> = self
            .store
            .list_applications()?
            .into_iter()
            .filter(|record| filter.status.map_or(true, |status| record.status == status))
            .filter(|record| {
                authorize_application(caller, ApplicationAction::Read, record).is_allowed()
            })
            .collect();
        records.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    pub fn approve(
        &self,
        caller: &Caller,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.application(id)?;
        ensure(authorize_application(caller, ApplicationAction::Review, &record))?;

        let previous = record.status;
        record.status = previous.transition_to(ApplicationStatus::Approved)?;
        let now = Utc::now();
        record.reviewed_by = Some(caller.id.clone());
        record.reviewed_at = Some(now);
        record.updated_at = now;

        let stored = self.store.update_application(record, previous)?;
        info!(application_id = %stored.id, reviewer = %caller.id, "application approved");
        self.notify("application_approved", &stored.user_id, &stored, BTreeMap::new());
        Ok(stored)
    }

    pub fn reject(
        &self,
        caller: &Caller,
        id: &ApplicationId,
        reason: &str,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.application(id)?;
        ensure(authorize_application(caller, ApplicationAction::Review, &record))?;

        let previous = record.status;
        record.status = previous.transition_to(ApplicationStatus::Rejected)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApplicationServiceError::InvalidInput(
                "rejection reason must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        record.reviewed_by = Some(caller.id.clone());
        record.reviewed_at = Some(now);
        record.rejection_reason = Some(reason.to_string());
        record.updated_at = now;

        let stored = self.store.update_application(record, previous)?;
        info!(application_id = %stored.id, reviewer = %caller.id, "application rejected");
        let mut details = BTreeMap::new();
        details.insert("reason".to_string(), reason.to_string());
        self.notify("application_rejected", &stored.user_id, &stored, details);
        Ok(stored)
    }

    /// Assign an approved application to a field agent, creating its installation.
    pub fn assign_agent(
        &self,
        caller: &Caller,
        id: &ApplicationId,
        assignment: AgentAssignment,
    ) -> Result<(ApplicationRecord, InstallationRecord), ApplicationServiceError> {
        let mut application = self.application(id)?;
        let agent = self
            .store
            .fetch_agent(&assignment.agent_id)?
            .ok_or_else(|| ApplicationServiceError::not_found("agent", &assignment.agent_id.0))?;
        ensure(authorize_application(
            caller,
            ApplicationAction::AssignAgent,
            &application,
        ))?;

        if !agent.active {
            return Err(ApplicationServiceError::InvalidInput(format!(
                "agent {} is not active",
                agent.id
            )));
        }

        let previous = application.status;
        application.status = previous.transition_to(ApplicationStatus::Scheduled)?;

        let sequence = self.store.next_sequence(Sequence::Installation)?;
        let now = Utc::now();
        let installation = InstallationRecord {
            id: InstallationId(format!("inst-{sequence:06}")),
            application_id: application.id.clone(),
            installer_id: agent.id.clone(),
            status: InstallationStatus::Scheduled,
            scheduled_date: assignment.scheduled_date,
            started_at: None,
            completed_at: None,
            actual_capacity_kw: None,
            notes: None,
            updated_at: now,
        };
        application.assigned_agent_id = Some(agent.id.clone());
        application.installation_id = Some(installation.id.clone());
        application.updated_at = now;

        let (application, installation) =
            self.store
                .schedule_installation(application, previous, installation)?;
        info!(
            application_id = %application.id,
            installation_id = %installation.id,
            agent = %agent.id,
            "installation scheduled"
        );

        let mut details = BTreeMap::new();
        details.insert("installation_id".to_string(), installation.id.0.clone());
        if let Some(date) = installation.scheduled_date {
            details.insert("scheduled_date".to_string(), date.to_string());
        }
        self.notify(
            "installation_scheduled",
            &application.user_id,
            &application,
            details.clone(),
        );
        self.notify("installation_assigned", &agent.id, &application, details);
        Ok((application, installation))
    }

    pub fn get_installation(
        &self,
        caller: &Caller,
        id: &InstallationId,
    ) -> Result<InstallationRecord, ApplicationServiceError> {
        let installation = self.installation(id)?;
        ensure(authorize_installation(
            caller,
            InstallationAction::Read,
            &installation,
        ))?;
        Ok(installation)
    }

    /// Record installation progress and mirror it onto the application.
    pub fn update_installation_status(
        &self,
        caller: &Caller,
        id: &InstallationId,
        update: InstallationUpdate,
    ) -> Result<(InstallationRecord, ApplicationRecord), ApplicationServiceError> {
        let mut installation = self.installation(id)?;
        let mut application = self.application(&installation.application_id)?;
        ensure(authorize_installation(
            caller,
            InstallationAction::UpdateStatus,
            &installation,
        ))?;

        let previous = installation.status;
        let next = previous.transition_to(update.status)?;
        let application_previous = application.status;
        let application_next = application_previous.transition_to(next.application_status())?;

        if let Some(capacity) = update.actual_capacity_kw {
            if !(capacity.is_finite() && capacity > 0.0) {
                return Err(ApplicationServiceError::InvalidInput(format!(
                    "actual capacity must be positive (found {capacity})"
                )));
            }
            installation.actual_capacity_kw = Some(capacity);
        }

        let now = Utc::now();
        match next {
            InstallationStatus::InProgress => installation.started_at = Some(now),
            InstallationStatus::Completed => {
                installation.completed_at = Some(now);
                if installation.actual_capacity_kw.is_none() {
                    installation.actual_capacity_kw = Some(application.requested_capacity_kw);
                }
            }
            InstallationStatus::Scheduled | InstallationStatus::Cancelled => {}
        }
        if let Some(notes) = update.notes.filter(|notes| !notes.trim().is_empty()) {
            installation.notes = Some(notes);
        }
        installation.status = next;
        installation.updated_at = now;
        application.status = application_next;
        application.updated_at = now;

        let (installation, application) = self.store.update_installation(
            installation,
            previous,
            application,
            application_previous,
        )?;
        info!(
            installation_id = %installation.id,
            application_id = %application.id,
            status = installation.status.label(),
            by = %caller.id,
            "installation progressed"
        );

        let mut details = BTreeMap::new();
        details.insert("installation_id".to_string(), installation.id.0.clone());
        details.insert(
            "status".to_string(),
            installation.status.label().to_string(),
        );
        self.notify(
            &format!("installation_{}", installation.status.label()),
            &application.user_id,
            &application,
            details,
        );
        Ok((installation, application))
    }

    pub fn create_scheme(
        &self,
        caller: &Caller,
        draft: SchemeDraft,
    ) -> Result<Scheme, ApplicationServiceError> {
        ensure(authorize_administration(caller, "create schemes"))?;
        validate_scheme(&draft)?;

        let sequence = self.store.next_sequence(Sequence::Scheme)?;
        let scheme = Scheme {
            id: SchemeId(format!("SCH-{sequence:03}")),
            name: draft.name.trim().to_string(),
            subsidy_percentage: draft.subsidy_percentage,
            max_subsidy_amount: draft.max_subsidy_amount,
            min_capacity_kw: draft.min_capacity_kw,
            max_capacity_kw: draft.max_capacity_kw,
            active: draft.active,
        };
        let stored = self.store.insert_scheme(scheme)?;
        info!(scheme_id = %stored.id, name = %stored.name, "scheme published");
        Ok(stored)
    }

    pub fn list_schemes(&self, active_only: bool) -> Result<Vec<Scheme>, ApplicationServiceError> {
        Ok(self
            .store
            .list_schemes()?
            .into_iter()
            .filter(|scheme| !active_only || scheme.active)
            .collect())
    }

    pub fn statistics(
        &self,
        caller: &Caller,
    ) -> Result<ApplicationStatistics, ApplicationServiceError> {
        ensure(authorize_administration(caller, "view application statistics"))?;

        let records = self.store.list_applications()?;
        let mut by_status: BTreeMap<&'static str, usize> = ApplicationStatus::ALL
            .iter()
            .map(|status| (status.label(), 0))
            .collect();
        for record in &records {
            *by_status.entry(record.status.label()).or_default() += 1;
        }

        Ok(ApplicationStatistics {
            total: records.len(),
            by_status,
        })
    }

    fn application(&self, id: &ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.store
            .fetch_application(id)?
            .ok_or_else(|| ApplicationServiceError::not_found("application", &id.0))
    }

    fn installation(
        &self,
        id: &InstallationId,
    ) -> Result<InstallationRecord, ApplicationServiceError> {
        self.store
            .fetch_installation(id)?
            .ok_or_else(|| ApplicationServiceError::not_found("installation", &id.0))
    }

    fn scheme(&self, id: &SchemeId) -> Result<Scheme, ApplicationServiceError> {
        self.store
            .fetch_scheme(id)?
            .ok_or_else(|| ApplicationServiceError::not_found("scheme", &id.0))
    }

    /// Best effort: a failed dispatch is logged and never unwinds the transition.
    fn notify(
        &self,
        template: &str,
        recipient: &UserId,
        record: &ApplicationRecord,
        details: BTreeMap<String, String>,
    ) {
        let notification = Notification {
            template: template.to_string(),
            recipient: recipient.clone(),
            application_id: record.id.clone(),
            details,
        };
        if let Err(error) = self.notifier.publish(notification) {
            warn!(
                %error,
                template,
                application_id = %record.id,
                recipient = %recipient,
                "notification dispatch failed"
            );
        }
    }
}

fn ensure(authorization: Authorization) -> Result<(), ApplicationServiceError> {
    authorization
        .into_result()
        .map_err(ApplicationServiceError::Forbidden)
}

fn validate_submission(
    submission: &ApplicationSubmission,
    scheme: &Scheme,
) -> Result<(), ApplicationServiceError> {
    let invalid = |message: String| Err(ApplicationServiceError::InvalidInput(message));

    if submission.applicant.full_name.trim().is_empty() {
        return invalid("applicant name is required".to_string());
    }
    if submission.applicant.phone.trim().is_empty() {
        return invalid("applicant phone is required".to_string());
    }
    if submission.property.address.trim().is_empty() {
        return invalid("property address is required".to_string());
    }
    let property = &submission.property;
    if !(property.roof_area_sqft.is_finite() && property.roof_area_sqft > 0.0) {
        return invalid(format!(
            "roof area must be positive (found {})",
            property.roof_area_sqft
        ));
    }
    if !(property.monthly_bill.is_finite() && property.monthly_bill > 0.0) {
        return invalid(format!(
            "monthly bill must be positive (found {})",
            property.monthly_bill
        ));
    }

    let capacity = submission.requested_capacity_kw;
    if !(capacity.is_finite() && capacity > 0.0) {
        return invalid(format!("requested capacity must be positive (found {capacity})"));
    }
    if !scheme.active {
        return invalid(format!("scheme {} is not accepting applications", scheme.id));
    }
    if !scheme.accepts_capacity(capacity) {
        return invalid(format!(
            "scheme {} covers {}-{} kW (requested {capacity} kW)",
            scheme.id, scheme.min_capacity_kw, scheme.max_capacity_kw
        ));
    }
    Ok(())
}

fn validate_scheme(draft: &SchemeDraft) -> Result<(), ApplicationServiceError> {
    let invalid = |message: &str| Err(ApplicationServiceError::InvalidInput(message.to_string()));

    if draft.name.trim().is_empty() {
        return invalid("scheme name is required");
    }
    if !(draft.subsidy_percentage > 0.0 && draft.subsidy_percentage <= 100.0) {
        return invalid("subsidy percentage must be within (0, 100]");
    }
    if !(draft.max_subsidy_amount.is_finite() && draft.max_subsidy_amount > 0.0) {
        return invalid("maximum subsidy must be positive");
    }
    if !(draft.min_capacity_kw.is_finite() && draft.min_capacity_kw > 0.0) {
        return invalid("minimum capacity must be positive");
    }
    if !(draft.max_capacity_kw.is_finite() && draft.max_capacity_kw >= draft.min_capacity_kw) {
        return invalid("maximum capacity must not be below the minimum");
    }
    Ok(())
}

/// Error raised by the lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl ApplicationServiceError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<RepositoryError> for ApplicationServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::StaleStatus { .. } | RepositoryError::Conflict => {
                Self::Conflict(error.to_string())
            }
            other => Self::Repository(other),
        }
    }
}
