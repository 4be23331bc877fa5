//! Output validation for rendered-prompt responses.
//!
//! Validators are declared on prompts and typed when the pack is parsed; this
//! crate runs them against arbitrary content and aggregates the outcome.

#![warn(missing_docs, clippy::pedantic)]

pub mod checks;
mod result;
mod runner;

pub use checks::ContentCheck;
pub use result::{ValidationResult, Violation};
pub use runner::{ValidatorRunner, run, run_async};
