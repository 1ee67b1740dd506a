// src/system/shell.rs

use std::env;
use thiserror::Error;

use crate::constants::{COMP_LINE_VAR, COMP_POINT_VAR};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Posición de cursor inválida en {var}: '{value}'")]
    InvalidPoint { var: &'static str, value: String },
}

/// Lo que la shell pide completar: las palabras tras el nombre del programa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub args: Vec<String>,
    /// Cierto si el cursor está dentro de la última palabra.
    pub inword: bool,
}

/// Lee la petición de autocompletado que deja `complete -C <programa> <programa>`.
/// Devuelve `None` si el programa no se ha invocado para autocompletar.
pub fn completion_request() -> Result<Option<CompletionRequest>, ShellError> {
    let Ok(line) = env::var(COMP_LINE_VAR) else {
        return Ok(None);
    };
    let point = env::var(COMP_POINT_VAR).ok();
    log::debug!("Petición de autocompletado: {:?} (cursor {:?})", line, point);
    parse_completion_line(&line, point.as_deref()).map(Some)
}

/// Corta la línea en el cursor (contado en caracteres) y la separa en palabras,
/// descartando la primera, que es el programa.
pub fn parse_completion_line(
    line: &str,
    point: Option<&str>,
) -> Result<CompletionRequest, ShellError> {
    let cut = match point {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| ShellError::InvalidPoint {
            var: COMP_POINT_VAR,
            value: raw.to_string(),
        })?,
        None => line.chars().count(),
    };
    let head: String = line.chars().take(cut).collect();
    let inword = head.chars().last().is_some_and(|c| !c.is_whitespace());

    Ok(CompletionRequest {
        args: head.split_whitespace().skip(1).map(str::to_string).collect(),
        inword,
    })
}
