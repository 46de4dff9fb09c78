//! Caller identity and the tagged authorization result shared by every workflow.
//!
//! Authentication happens upstream; the HTTP surface receives the already verified
//! identity through the `x-user-id` and `x-user-role` headers.

use std::fmt;
use std::str::FromStr;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identifier for any platform account (citizens, agents, administrators).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
    Admin,
    #[serde(alias = "super_admin")]
    SuperAdmin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Admins and superadmins share unrestricted access.
    pub const fn is_administrative(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" | "citizen" => Ok(Role::User),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            "superadmin" | "super_admin" => Ok(Role::SuperAdmin),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated principal invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            role,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AccessError> {
        let id = header_value(headers, USER_ID_HEADER)?;
        let role = header_value(headers, USER_ROLE_HEADER)?.parse()?;
        Ok(Self::new(id, role))
    }

    pub fn is(&self, id: &UserId) -> bool {
        &self.id == id
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, AccessError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AccessError::MissingHeader(name))
}

/// Outcome of a policy check, evaluated before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Forbidden(String),
}

impl Authorization {
    pub fn forbid(reason: impl Into<String>) -> Self {
        Authorization::Forbidden(reason.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed)
    }

    pub fn into_result(self) -> Result<(), String> {
        match self {
            Authorization::Allowed => Ok(()),
            Authorization::Forbidden(reason) => Err(reason),
        }
    }
}

/// Gate for platform-wide administration (schemes, region coefficients, statistics).
pub fn authorize_administration(caller: &Caller, activity: &str) -> Authorization {
    if caller.role.is_administrative() {
        Authorization::Allowed
    } else {
        Authorization::forbid(format!(
            "{} role may not {activity}",
            caller.role.label()
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("missing or empty {0} header")]
    MissingHeader(&'static str),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}
