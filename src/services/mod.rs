pub mod daily;
pub mod goals;
pub mod revenue;
pub mod shift_progress;
pub mod validation;
