// src/lib.rs

//! Un despachador recursivo de subcomandos.
//!
//! Un programa registra un árbol de comandos con nombre en un [`Commander`]; cada
//! comando puede exponer, de forma independiente, sus propios flags ([`Flagger`]),
//! sus estrategias de autocompletado ([`Completer`]) o ser a su vez un despachador.
//! [`execute`] resuelve el vector de argumentos del proceso contra ese árbol, o
//! atiende la petición de autocompletado de la shell recorriendo el mismo árbol.

pub mod config;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::config::Settings;
pub use crate::core::capabilities::{Capabilities, Cmd, Completer, Flagger};
pub use crate::core::commander::{Commander, DispatchError, DispatchResult, launch, prepare};
pub use crate::core::entry::{complete, dispatch, execute};
pub use crate::system::compgen::{ArgsGen, Terminator};
pub use crate::system::flagset::{Flag, FlagError, FlagSet};
