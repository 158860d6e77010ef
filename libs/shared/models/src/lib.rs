pub mod appointment;
pub mod billing;
pub mod clinic;
pub mod error;
