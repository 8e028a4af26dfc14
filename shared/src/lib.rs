//! Shared types and models for the Anar trade calculator
//!
//! Everything here is pure computation over plain data, so the same code runs
//! in the backend and in the browser (via WASM).

pub mod alerts;
pub mod coerce;
pub mod engine;
pub mod export;
pub mod history;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::{
    compute_result, compute_result_at, compute_safe_buy, compute_safe_buy_with_factor,
    default_safe_buy_factor,
};
pub use models::*;
pub use types::*;
pub use validation::*;
