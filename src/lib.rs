// Shared infrastructure
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

// Domain
pub mod animal;
pub mod notification;
pub mod transition;

// Application layer
pub mod api;
pub mod server;
