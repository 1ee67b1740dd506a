// src/constants.rs

/// El nombre del flag de ayuda que toda superficie de flags incorpora.
pub const HELP_FLAG: &str = "help";

/// La forma corta del flag de ayuda.
pub const HELP_SHORT: char = 'h';

/// El token que activa el comando `help` integrado (si está habilitado).
pub const HELP_COMMAND: &str = "help";

/// Identificador interno del argumento posicional que recoge los tokens sobrantes.
pub const RESIDUAL_ARGS_ID: &str = "__residual";

/// Variable de entorno con la línea que la shell quiere completar.
pub const COMP_LINE_VAR: &str = "COMP_LINE";

/// Variable de entorno con la posición del cursor dentro de `COMP_LINE`.
pub const COMP_POINT_VAR: &str = "COMP_POINT";

/// El nombre del archivo de ajustes (dentro de ~/.config/<programa>/).
pub const SETTINGS_FILENAME: &str = "cmdtree.toml";

/// Código de salida por defecto para cualquier fallo de resolución.
pub const DEFAULT_FAILURE_EXIT_CODE: i32 = 1;
