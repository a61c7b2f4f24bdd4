pub mod config;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod infra;
pub mod middleware;
pub mod repository;
pub mod state;
