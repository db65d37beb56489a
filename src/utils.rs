pub mod classifier;
pub mod config;
pub mod errors;
pub mod fact_fetcher;
pub mod server_utils;
