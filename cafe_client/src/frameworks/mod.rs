// Frameworks: env configuration and process bootstrap.

pub mod config;
pub mod runtime;
