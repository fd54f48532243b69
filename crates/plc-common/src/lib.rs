#![doc = "Common types shared across the PLC type system workspace."]

pub mod config;
pub mod error;
pub mod iec_types;

pub use config::*;
pub use error::*;
pub use iec_types::*;
