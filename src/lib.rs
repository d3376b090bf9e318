// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Rendering core
pub mod injector;
pub mod markup;
pub mod render;
pub mod template;

// Delivery
pub mod mailer;

// Application layer
pub mod api;
pub mod server;
