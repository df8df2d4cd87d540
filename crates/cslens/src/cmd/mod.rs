//! Command implementations for the cslens CLI

pub mod decode;
pub mod serve;
