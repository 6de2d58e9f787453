pub mod app;
pub mod config;
pub mod error;
pub mod inventory;
pub mod storage;
pub mod telemetry;
