// src/system/executor.rs

use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("El comando '{0}' no se pudo ejecutar: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("El comando '{0}' finalizó con un código de error: {1:?}")]
    NonZeroExitStatus(String, Option<i32>),
}

/// Ejecuta un comando de sistema y devuelve las líneas no vacías de su salida estándar.
/// La salida de error del subproceso se descarta para no ensuciar el autocompletado.
pub fn capture_lines(command_line: &str) -> Result<Vec<String>, ExecutionError> {
    log::debug!("Capturando salida de: '{}'", command_line);

    // Determina la shell a usar. En Windows, `cmd`.
    let (shell, arg) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    let output = StdCommand::new(shell)
        .arg(arg)
        .arg(command_line)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.to_string(), e))?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(
            command_line.to_string(),
            output.status.code(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
