//! Shared types and models for the TickWatch platform
//!
//! This crate contains the risk scoring calculator and the types shared
//! between the backend, the mobile client (via WASM), and other components.

pub mod models;
pub mod risk;
pub mod types;
pub mod validation;

pub use models::*;
pub use risk::*;
pub use types::*;
pub use validation::*;
