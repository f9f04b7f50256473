//! Loan approval scoring: intake clamping, feature engineering, one-hot encoding against a
//! trained model's feature schema, scoring through externally fitted artifacts, and risk
//! commentary for rejected applicants.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
