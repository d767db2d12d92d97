pub mod dashboard;
pub mod goals;
pub mod metrics;
pub mod settings;
