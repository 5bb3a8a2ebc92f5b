//! Terminal output helpers.

pub mod output;
pub mod progress;
