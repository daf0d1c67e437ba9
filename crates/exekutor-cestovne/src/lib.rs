pub mod batch;
pub mod config;
pub mod error;
pub mod reimbursement;
pub mod routing;
pub mod telemetry;
