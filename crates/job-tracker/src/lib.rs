pub mod board;
pub mod candidates;
pub mod config;
pub mod error;
pub mod telemetry;
