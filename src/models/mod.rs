//! Data models for the load test run

pub mod config;
pub mod outcome;
pub mod report;

pub use config::RunConfig;
pub use outcome::RequestOutcome;
pub use report::RunReport;
