//! Core models, errors and configuration

pub mod config;
pub mod errors;
pub mod models;
