pub mod auth;
pub mod batch;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod services;
pub mod types;
pub mod validation;
