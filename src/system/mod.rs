// src/system/mod.rs

pub mod compgen;
pub mod executor;
pub mod flagset;
pub mod shell;
