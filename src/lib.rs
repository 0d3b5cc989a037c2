// define modules in crate
pub mod client;
pub mod config;
pub mod cqrs;
pub mod domain;
pub mod dtos;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod routes;
pub mod state;
