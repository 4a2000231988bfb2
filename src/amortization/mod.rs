//! Schedule computation for single loans and loan portfolios.

pub mod aggregate;
pub mod engine;
