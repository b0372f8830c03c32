// Shared infrastructure
pub mod config;
pub mod error;
pub mod telemetry;

// Domain
pub mod event;
pub mod template;

// Application
pub mod pipeline;
