// src/core/mod.rs

pub mod capabilities;
pub mod commander;
pub mod completion;
pub mod entry;
pub mod usage;
