pub mod api;
pub mod chain;
pub mod config;
pub mod forecast;
pub mod ingest;
pub mod sampler;
pub mod store;

pub mod logger;
