//! Rooftop solar subsidy administration: sizing estimates and the application lifecycle.

pub mod access;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
