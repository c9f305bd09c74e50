//! AI Generation Gateway
//!
//! This library provides the core functionality for the gengate service, a
//! stateless HTTP gateway that forwards chat and image-to-video generation
//! requests to upstream AI providers while keeping provider API keys
//! server-side.

pub mod app_state;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
