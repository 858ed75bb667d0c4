#![forbid(unsafe_code)]

//! Client library for the practice-test backend.
//!
//! The heart of the crate is [`stream`], which decodes the backend's
//! line-delimited JSON response streams. [`api`] exposes the backend's HTTP
//! surface as typed services on top of it.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod stream;

pub use config::ClientConfig;
pub use errors::{AppError, Result};
