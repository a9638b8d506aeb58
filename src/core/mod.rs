//! Core types, errors, and the validation accumulator.

pub mod context;
pub mod error;
pub mod pin;
pub mod resource;
pub mod types;
