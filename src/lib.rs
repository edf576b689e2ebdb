pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
