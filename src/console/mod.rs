//! Terminal delivery.

pub mod prompt;
