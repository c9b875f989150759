pub mod accuracy;
pub mod api;
pub mod config;
pub mod domain;
pub mod service;
pub mod source;
pub mod state;
pub mod telemetry;
