//! Typed records used across layers.

pub mod push;
pub mod verification;
