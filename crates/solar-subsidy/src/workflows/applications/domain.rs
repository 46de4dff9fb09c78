use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::access::UserId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstallationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemeId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Government programme an application is filed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: SchemeId,
    pub name: String,
    pub subsidy_percentage: f64,
    pub max_subsidy_amount: f64,
    pub min_capacity_kw: f64,
    pub max_capacity_kw: f64,
    pub active: bool,
}

impl Scheme {
    pub fn accepts_capacity(&self, capacity_kw: f64) -> bool {
        capacity_kw >= self.min_capacity_kw && capacity_kw <= self.max_capacity_kw
    }
}

/// Administrator supplied fields for a new scheme; the id is assigned on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeDraft {
    pub name: String,
    pub subsidy_percentage: f64,
    pub max_subsidy_amount: f64,
    pub min_capacity_kw: f64,
    pub max_capacity_kw: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Field agent who can be assigned installations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: UserId,
    pub name: String,
    pub region: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub address: String,
    pub district: String,
    pub state: String,
    pub roof_area_sqft: f64,
    pub monthly_bill: f64,
    #[serde(default)]
    pub consumer_number: Option<String>,
}

/// Citizen supplied request body for a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub scheme_id: SchemeId,
    pub applicant: ApplicantDetails,
    pub property: PropertyDetails,
    pub requested_capacity_kw: f64,
}

/// Status of an application from submission through installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Scheduled,
    InProgress,
    Installed,
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Scheduled,
        ApplicationStatus::InProgress,
        ApplicationStatus::Installed,
        ApplicationStatus::Cancelled,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Scheduled => "scheduled",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Installed => "installed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }
}

/// Status of the fulfilment record created on assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InstallationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InstallationStatus::Scheduled => "scheduled",
            InstallationStatus::InProgress => "in_progress",
            InstallationStatus::Completed => "completed",
            InstallationStatus::Cancelled => "cancelled",
        }
    }
}

/// Assignment request issued by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub agent_id: UserId,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
}

/// Progress report against an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationUpdate {
    pub status: InstallationStatus,
    #[serde(default)]
    pub actual_capacity_kw: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InstallationUpdate {
    pub fn to(status: InstallationStatus) -> Self {
        Self {
            status,
            actual_capacity_kw: None,
            notes: None,
        }
    }
}

/// Optional narrowing applied to application listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}
