// src/lib.rs

pub mod bank;
pub mod clock;
pub mod config;
pub mod daily;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
