pub mod commands;
pub mod coordinator;
pub mod loader;
pub mod uploads;
