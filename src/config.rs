// src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_FAILURE_EXIT_CODE, SETTINGS_FILENAME};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No se pudo encontrar el directorio de configuración del sistema.")]
    ConfigDirNotFound,
    #[error("No se pudo leer el archivo de ajustes: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear TOML en '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// El flujo por el que se imprime el texto de uso.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UsageStream {
    #[default]
    Stderr,
    Stdout,
}

/// Ajustes del punto de entrada. Todos los campos tienen valor por defecto,
/// así que un archivo vacío (o inexistente) es válido.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub failure_exit_code: i32,
    pub usage_stream: UsageStream,
    pub completion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            failure_exit_code: DEFAULT_FAILURE_EXIT_CODE,
            usage_stream: UsageStream::Stderr,
            completion: true,
        }
    }
}

impl Settings {
    /// Carga los ajustes de un archivo concreto. Si no existe, devuelve los valores por defecto.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("Sin archivo de ajustes en {:?}, usando valores por defecto.", path);
            return Ok(Self::default());
        }
        log::info!("Cargando ajustes desde: {:?}", path);
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Carga los ajustes del programa desde su directorio de configuración.
    pub fn load_for(program: &str) -> Result<Self, ConfigError> {
        Self::load_from(&settings_path(program)?)
    }
}

/// Devuelve la ruta al directorio de configuración de un programa.
/// No lo crea: los ajustes son de solo lectura.
pub fn config_dir_for(program: &str) -> Result<PathBuf, ConfigError> {
    let config_path = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(program);
    log::debug!("Directorio de config: {:?}", config_path);
    Ok(config_path)
}

/// Devuelve la ruta al archivo de ajustes de un programa.
pub fn settings_path(program: &str) -> Result<PathBuf, ConfigError> {
    config_dir_for(program).map(|dir| dir.join(SETTINGS_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.failure_exit_code, 1);
        assert!(settings.completion);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "usage_stream = \"stdout\"\nfailure_exit_code = 3").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.usage_stream, UsageStream::Stdout);
        assert_eq!(settings.failure_exit_code, 3);
        assert!(settings.completion);
    }

    #[test]
    fn malformed_file_is_reported_with_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "completion = \"quizas\"").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        match err {
            ConfigError::TomlParse { path, .. } => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("se esperaba TomlParse, se obtuvo {other:?}"),
        }
    }
}
