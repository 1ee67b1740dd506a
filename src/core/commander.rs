// src/core/commander.rs

use std::collections::HashMap;
use thiserror::Error;

use crate::constants::HELP_COMMAND;
use crate::core::capabilities::{Capabilities, Cmd, required_flags};
use crate::core::usage;
use crate::models::CommandRecord;
use crate::system::compgen::Terminator;
use crate::system::flagset::{FlagError, FlagSet};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No se indicó ningún comando para '{commander}'.")]
    MissingArguments { commander: String, usage: String },
    #[error("Comando desconocido '{name}' para '{commander}'.")]
    NoSuchCommand {
        commander: String,
        name: String,
        usage: String,
    },
    #[error("Faltan flags obligatorios para '{command}': {}", .missing.join(", "))]
    MissingRequiredFlag {
        command: String,
        missing: Vec<String>,
        usage: String,
    },
    #[error("Flags mal formados para '{command}': {source}")]
    MalformedFlag {
        command: String,
        #[source]
        source: FlagError,
    },
    #[error("Ayuda solicitada para '{command}'.")]
    HelpRequested { command: String, usage: String },
    #[error("El comando '{command}' falló: {source}")]
    Handler {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// El texto de uso que acompaña al error, si lo hay.
    pub fn usage(&self) -> Option<&str> {
        match self {
            Self::MissingArguments { usage, .. }
            | Self::NoSuchCommand { usage, .. }
            | Self::MissingRequiredFlag { usage, .. }
            | Self::HelpRequested { usage, .. } => Some(usage),
            Self::MalformedFlag { .. } | Self::Handler { .. } => None,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Un nodo del árbol de comandos: registra subcomandos por nombre y resuelve
/// el primer token de los argumentos contra ellos.
///
/// Un `Commander` es también un `Cmd`, así que puede registrarse dentro de otro.
/// Los tipos que quieran añadir flags propios lo guardan en un campo y lo
/// exponen con `Cmd::as_commander`.
#[derive(Debug, Default)]
pub struct Commander {
    name: String,
    cmds: HashMap<String, CommandRecord>,
    help_command: bool,
}

impl Commander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Habilita el comando `help` integrado (si nadie registra uno propio con ese nombre).
    pub fn with_help_command(mut self) -> Self {
        self.help_command = true;
        self
    }

    /// El nombre con el que se muestra este despachador (p. ej. `git remote`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fija el nombre cualificado. Lo hace `prepare` al descender por el árbol.
    pub fn set_path(&mut self, qname: &str) {
        self.name = qname.to_string();
    }

    /// Registra un subcomando. Un nombre repetido reemplaza al anterior.
    pub fn register(
        &mut self,
        name: &str,
        syntax: &str,
        description: &str,
        handler: impl Cmd + 'static,
    ) {
        if self.cmds.contains_key(name) {
            log::debug!("Reemplazando el comando '{}' en '{}'.", name, self.name);
        }
        self.cmds.insert(
            name.to_string(),
            CommandRecord {
                name: name.to_string(),
                syntax: syntax.to_string(),
                description: description.to_string(),
                handler: Box::new(handler),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CommandRecord> {
        self.cmds.get(name)
    }

    /// Los registros, sin orden definido.
    pub fn records(&self) -> impl Iterator<Item = &CommandRecord> {
        self.cmds.values()
    }

    pub(crate) fn record_mut(&mut self, name: &str) -> Option<&mut CommandRecord> {
        self.cmds.get_mut(name)
    }

    /// Los nombres a ofrecer al autocompletar el primer token.
    pub(crate) fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cmds.keys().cloned().collect();
        if self.offers_help_command() {
            names.push(HELP_COMMAND.to_string());
        }
        names
    }

    pub(crate) fn offers_help_command(&self) -> bool {
        self.help_command && !self.cmds.contains_key(HELP_COMMAND)
    }

    pub(crate) fn qualified(&self, name: &str) -> String {
        if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", self.name, name)
        }
    }

    /// Resuelve `args[0]` contra los subcomandos registrados y lanza el que coincida
    /// con el resto de argumentos. `fs` es la superficie de flags de este despachador,
    /// si la tiene, y solo se usa para mostrar el uso.
    pub fn resolve(&mut self, args: &[String], fs: Option<&FlagSet>) -> DispatchResult<()> {
        log::debug!("Resolviendo {:?} en '{}'", args, self.name);

        let Some(first) = args.first() else {
            return Err(DispatchError::MissingArguments {
                commander: self.name.clone(),
                usage: usage::commander_usage(self, fs),
            });
        };

        if first == HELP_COMMAND && self.offers_help_command() {
            return Err(self.help_for(args.get(1), fs));
        }

        let qname = self.qualified(first);
        match self.cmds.get_mut(first.as_str()) {
            Some(record) => launch(record.handler.as_mut(), &qname, args),
            None => Err(DispatchError::NoSuchCommand {
                commander: self.name.clone(),
                name: first.clone(),
                usage: usage::commander_usage(self, fs),
            }),
        }
    }

    fn help_for(&mut self, target: Option<&String>, fs: Option<&FlagSet>) -> DispatchError {
        if let Some(name) = target
            && self.cmds.contains_key(name.as_str())
        {
            let qname = self.qualified(name);
            if let Some(record) = self.cmds.get_mut(name.as_str()) {
                let handler = record.handler.as_mut();
                let (sub_fs, _) = prepare(handler, &qname);
                return DispatchError::HelpRequested {
                    usage: usage::command_usage(handler, &qname, &sub_fs),
                    command: qname,
                };
            }
        }
        DispatchError::HelpRequested {
            command: self.name.clone(),
            usage: usage::commander_usage(self, fs),
        }
    }
}

impl Cmd for Commander {
    fn run(&mut self, args: &[String]) -> anyhow::Result<()> {
        Ok(self.resolve(args, None)?)
    }

    fn as_commander(&mut self) -> Option<&mut Commander> {
        Some(self)
    }
}

/// Construye la superficie de flags y la de autocompletado de un comando,
/// consultando qué capacidades expone.
///
/// Si el comando es un despachador, su nombre se fija antes que nada para que
/// el uso anidado sea correcto aunque el parseo falle después.
pub fn prepare(cmd: &mut dyn Cmd, qname: &str) -> (FlagSet, Terminator) {
    let caps = Capabilities::of(cmd);
    log::debug!("Preparando '{}' con {:?}", qname, caps);

    if let Some(commander) = cmd.as_commander() {
        commander.set_path(qname);
    }
    let mut fs = FlagSet::new(qname);
    if let Some(flagger) = cmd.as_flagger() {
        flagger.flags(&mut fs);
    }
    let mut term = Terminator::new(&fs);
    if let Some(completer) = cmd.as_completer() {
        completer.compgens(&mut term);
    }
    (fs, term)
}

/// Lanza un comando ya seleccionado. `args[0]` es el token que lo seleccionó
/// (o el programa, en la raíz); el resto se parsea contra sus flags.
///
/// Orden: flags mal formados, flags obligatorios, ayuda, y por último la
/// recursión (si es un despachador con subcomandos) o `run`.
pub fn launch(cmd: &mut dyn Cmd, qname: &str, args: &[String]) -> DispatchResult<()> {
    let (fs, _) = prepare(cmd, qname);

    let parsed = fs
        .parse(args.get(1..).unwrap_or_default())
        .map_err(|source| DispatchError::MalformedFlag {
            command: qname.to_string(),
            source,
        })?;

    let missing: Vec<String> = required_flags(cmd)
        .into_iter()
        .filter(|name| !parsed.was_set(name))
        .collect();
    if !missing.is_empty() {
        return Err(DispatchError::MissingRequiredFlag {
            command: qname.to_string(),
            missing,
            usage: usage::command_usage(cmd, qname, &fs),
        });
    }

    if parsed.help_requested() {
        return Err(DispatchError::HelpRequested {
            command: qname.to_string(),
            usage: usage::command_usage(cmd, qname, &fs),
        });
    }

    let residual = parsed.residual();
    if let Some(commander) = cmd.as_commander()
        && !commander.is_empty()
    {
        return commander.resolve(residual, Some(&fs));
    }

    log::info!("Ejecutando '{}' con {:?}", qname, residual);
    cmd.run(residual)
        .map_err(|source| match source.downcast::<DispatchError>() {
            Ok(inner) => inner,
            Err(source) => DispatchError::Handler {
                command: qname.to_string(),
                source,
            },
        })
}
