use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::access::UserId;

use super::domain::{
    AgentProfile, ApplicationId, ApplicationStatus, InstallationId, InstallationStatus, Scheme,
    SchemeId,
};
use super::repository::{
    ApplicationRecord, InstallationRecord, LifecycleStore, RepositoryError, Sequence,
};

#[derive(Debug, Default)]
struct Tables {
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    installations: BTreeMap<InstallationId, InstallationRecord>,
    schemes: BTreeMap<SchemeId, Scheme>,
    agents: BTreeMap<UserId, AgentProfile>,
    issued: BTreeMap<Sequence, u64>,
}

/// Mutex-backed store; each write checks the expected status under the same lock it writes with.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLifecycleStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryLifecycleStore {
    pub fn with_reference_data(schemes: Vec<Scheme>, agents: Vec<AgentProfile>) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().expect("store mutex poisoned");
            for scheme in schemes {
                tables.schemes.insert(scheme.id.clone(), scheme);
            }
            for agent in agents {
                tables.agents.insert(agent.id.clone(), agent);
            }
        }
        store
    }

    pub fn register_agent(&self, agent: AgentProfile) {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables.agents.insert(agent.id.clone(), agent);
    }
}

/// Largest trailing number among `prefix-NNN` style identifiers; other shapes are ignored.
fn highest_suffix<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.rsplit('-').next()?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn check_application(
    tables: &Tables,
    id: &ApplicationId,
    expected: ApplicationStatus,
) -> Result<(), RepositoryError> {
    let current = tables
        .applications
        .get(id)
        .ok_or(RepositoryError::NotFound)?;
    if current.status == expected {
        Ok(())
    } else {
        Err(RepositoryError::StaleStatus {
            expected: expected.label(),
            found: current.status.label(),
        })
    }
}

fn check_installation(
    tables: &Tables,
    id: &InstallationId,
    expected: InstallationStatus,
) -> Result<(), RepositoryError> {
    let current = tables
        .installations
        .get(id)
        .ok_or(RepositoryError::NotFound)?;
    if current.status == expected {
        Ok(())
    } else {
        Err(RepositoryError::StaleStatus {
            expected: expected.label(),
            found: current.status.label(),
        })
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let duplicate_number = tables
            .applications
            .values()
            .any(|existing| existing.application_number == record.application_number);
        if tables.applications.contains_key(&record.id) || duplicate_number {
            return Err(RepositoryError::Conflict);
        }
        tables.applications.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.applications.get(id).cloned())
    }

    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.applications.values().cloned().collect())
    }

    fn update_application(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        check_application(&tables, &record.id, expected)?;
        tables.applications.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn schedule_installation(
        &self,
        application: ApplicationRecord,
        expected: ApplicationStatus,
        installation: InstallationRecord,
    ) -> Result<(ApplicationRecord, InstallationRecord), RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        check_application(&tables, &application.id, expected)?;
        let already_scheduled = tables.installations.contains_key(&installation.id)
            || tables
                .installations
                .values()
                .any(|existing| existing.application_id == application.id);
        if already_scheduled {
            return Err(RepositoryError::Conflict);
        }

        tables
            .applications
            .insert(application.id.clone(), application.clone());
        tables
            .installations
            .insert(installation.id.clone(), installation.clone());
        Ok((application, installation))
    }

    fn fetch_installation(
        &self,
        id: &InstallationId,
    ) -> Result<Option<InstallationRecord>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.installations.get(id).cloned())
    }

    fn update_installation(
        &self,
        installation: InstallationRecord,
        expected: InstallationStatus,
        application: ApplicationRecord,
        application_expected: ApplicationStatus,
    ) -> Result<(InstallationRecord, ApplicationRecord), RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        check_installation(&tables, &installation.id, expected)?;
        check_application(&tables, &application.id, application_expected)?;

        tables
            .installations
            .insert(installation.id.clone(), installation.clone());
        tables
            .applications
            .insert(application.id.clone(), application.clone());
        Ok((installation, application))
    }

    fn insert_scheme(&self, scheme: Scheme) -> Result<Scheme, RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables.schemes.contains_key(&scheme.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.schemes.insert(scheme.id.clone(), scheme.clone());
        Ok(scheme)
    }

    fn fetch_scheme(&self, id: &SchemeId) -> Result<Option<Scheme>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.schemes.get(id).cloned())
    }

    fn list_schemes(&self) -> Result<Vec<Scheme>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.schemes.values().cloned().collect())
    }

    fn fetch_agent(&self, id: &UserId) -> Result<Option<AgentProfile>, RepositoryError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.agents.get(id).cloned())
    }

    fn next_sequence(&self, sequence: Sequence) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let stored = match sequence {
            Sequence::Application => {
                highest_suffix(tables.applications.keys().map(|id| id.0.as_str()))
            }
            Sequence::Installation => {
                highest_suffix(tables.installations.keys().map(|id| id.0.as_str()))
            }
            Sequence::Scheme => highest_suffix(tables.schemes.keys().map(|id| id.0.as_str())),
        };
        let issued = tables.issued.entry(sequence).or_insert(0);
        *issued = (*issued).max(stored) + 1;
        Ok(*issued)
    }
}
