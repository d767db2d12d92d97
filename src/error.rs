use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Shift window is degenerate: end {end} is not after start {start}")]
    DegenerateWindow { start: u32, end: u32 },

    #[error("Revenue conversion yields no net income (commission {commission_rate}, tax {tax_rate})")]
    InvalidConversion { commission_rate: f64, tax_rate: f64 },

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Validation errors: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
