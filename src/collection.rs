//! Data collection. Each submodule reads one kind of system data.

pub mod error;
pub mod memory;
