// src/models.rs

use std::fmt;

use crate::core::capabilities::Cmd;

// --- REGISTRO DE COMANDOS ---

/// La unidad de registro: un nombre, su ayuda de sintaxis, su descripción y el comando.
///
/// Se crea al registrar y no se modifica nunca; registrar otra vez el mismo
/// nombre reemplaza el registro entero.
pub struct CommandRecord {
    pub name: String,
    pub syntax: String,
    pub description: String,
    pub handler: Box<dyn Cmd>,
}

impl fmt::Debug for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRecord")
            .field("name", &self.name)
            .field("syntax", &self.syntax)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// --- DESCRIPCIÓN DE FLAGS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Value,
}

/// Una fila de la superficie de flags, tal como se muestra en el uso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInfo {
    pub name: String,
    pub kind: FlagKind,
    /// El valor por defecto en texto. `None` si es booleano o está vacío.
    pub default: Option<String>,
    pub usage: String,
}

impl FlagInfo {
    pub fn takes_value(&self) -> bool {
        self.kind == FlagKind::Value
    }

    /// La forma en que se escribe el flag en la línea de comandos.
    pub fn spelling(&self) -> String {
        format!("--{}", self.name)
    }
}
