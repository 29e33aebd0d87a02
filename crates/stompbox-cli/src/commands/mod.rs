//! CLI command implementations.

pub mod effects;
pub mod process;
pub mod tap;
