pub mod dtos;
pub mod extractors;
pub mod handlers;
pub mod providers;
pub mod router;
pub mod service;
