pub mod configuration;
pub mod domain;
pub mod rate_limiter;
pub mod routes;
pub mod startup;
pub mod telemetry;
