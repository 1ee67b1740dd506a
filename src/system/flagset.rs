// src/system/flagset.rs

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{HELP_FLAG, HELP_SHORT, RESIDUAL_ARGS_ID};
use crate::models::{FlagInfo, FlagKind};

#[derive(Error, Debug)]
pub enum FlagError {
    #[error(transparent)]
    Parse(#[from] clap::Error),
    #[error("Valor inválido '{value}' para el flag '--{flag}': {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

type FlagResult<T> = Result<T, FlagError>;

/// Almacenamiento compartido de un flag. El comando lo guarda al configurar sus flags
/// y lo lee en `run`, después de que la superficie haya parseado los tokens.
pub struct Flag<T>(Rc<RefCell<T>>);

impl<T> Clone for Flag<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone> Flag<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Devuelve una copia del valor actual.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }

    fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}

impl<T: Clone + Default> Default for Flag<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Flag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flag").field(&self.0.borrow()).finish()
    }
}

type Binder = Box<dyn Fn(&ArgMatches) -> FlagResult<()>>;

/// La superficie de flags de un comando concreto.
///
/// Se crea vacía (solo con `-h/--help`) para cada invocación, el comando la puebla
/// en `Flagger::flags`, y después parsea los tokens que siguen al nombre del comando.
/// El parseo se detiene en el primer token posicional: lo que venga después
/// (flags incluidos) pertenece al resto y no a este comando.
pub struct FlagSet {
    name: String,
    args: Vec<Arg>,
    flags: Vec<FlagInfo>,
    binders: Vec<Binder>,
}

/// Resultado de parsear una superficie de flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    set: Vec<String>,
    residual: Vec<String>,
    help: bool,
}

impl ParsedFlags {
    /// Los flags que el usuario escribió explícitamente (no los valores por defecto).
    pub fn set_flags(&self) -> &[String] {
        &self.set
    }

    pub fn was_set(&self, name: &str) -> bool {
        self.set.iter().any(|s| s == name)
    }

    /// Los tokens posicionales que sobran tras el parseo.
    pub fn residual(&self) -> &[String] {
        &self.residual
    }

    pub fn help_requested(&self) -> bool {
        self.help
    }
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            flags: Vec::new(),
            binders: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Todos los flags declarados, en orden de declaración. No incluye `--help`.
    pub fn flags(&self) -> &[FlagInfo] {
        &self.flags
    }

    pub fn lookup(&self, name: &str) -> Option<&FlagInfo> {
        self.flags.iter().find(|f| f.name == name)
    }

    // --- DECLARACIÓN DE FLAGS ---

    /// Declara un flag booleano (`--name`, `--name=true`, `--name=false`).
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Flag<bool> {
        let flag = Flag::new(default);
        self.bool_var(&flag, name, default, usage);
        flag
    }

    /// Como `bool`, pero enlazado a un almacenamiento ya existente.
    pub fn bool_var(&mut self, flag: &Flag<bool>, name: &str, default: bool, usage: &str) {
        let arg = self
            .base_arg(name, usage)
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_value(default.to_string())
            .default_missing_value("true")
            .value_parser(clap::value_parser!(bool));

        let handle = flag.clone();
        let key = name.to_string();
        let binder: Binder = Box::new(move |matches| {
            if let Some(value) = matches.get_one::<bool>(&key) {
                handle.set(*value);
            }
            Ok(())
        });

        // `false` es lo esperado en un interruptor y no se muestra en el uso.
        let shown_default = default.then(|| default.to_string());
        if self.declare(arg, name, FlagKind::Bool, shown_default, usage, binder) {
            flag.set(default);
        }
    }

    /// Declara un flag de texto con su valor por defecto.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Flag<String> {
        self.value(name, default.to_string(), usage)
    }

    pub fn string_var(&mut self, flag: &Flag<String>, name: &str, default: &str, usage: &str) {
        self.value_var(flag, name, default.to_string(), usage);
    }

    /// Declara un flag con valor de cualquier tipo parseable desde texto.
    pub fn value<T>(&mut self, name: &str, default: T, usage: &str) -> Flag<T>
    where
        T: FromStr + Display + Clone + 'static,
        T::Err: Display,
    {
        let flag = Flag::new(default.clone());
        self.value_var(&flag, name, default, usage);
        flag
    }

    pub fn value_var<T>(&mut self, flag: &Flag<T>, name: &str, default: T, usage: &str)
    where
        T: FromStr + Display + Clone + 'static,
        T::Err: Display,
    {
        let default_text = default.to_string();

        let mut arg = self
            .base_arg(name, usage)
            .action(ArgAction::Set)
            .value_name("valor");
        // Un valor vacío no se registra en clap; si el flag no aparece, el
        // almacenamiento conserva el valor por defecto.
        let shown_default = if default_text.is_empty() {
            None
        } else {
            arg = arg.default_value(default_text.clone());
            Some(default_text)
        };

        let handle = flag.clone();
        let key = name.to_string();
        let binder: Binder = Box::new(move |matches| {
            if let Some(raw) = matches.get_one::<String>(&key) {
                let parsed = raw.parse::<T>().map_err(|e| FlagError::InvalidValue {
                    flag: key.clone(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                handle.set(parsed);
            }
            Ok(())
        });

        if self.declare(arg, name, FlagKind::Value, shown_default, usage, binder) {
            flag.set(default);
        }
    }

    fn base_arg(&self, name: &str, usage: &str) -> Arg {
        let mut arg = Arg::new(name.to_string())
            .long(name.to_string())
            .help(usage.to_string());
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c != HELP_SHORT
        {
            arg = arg.short(c);
        }
        arg
    }

    /// Registra el flag. Un nombre ya declarado se reemplaza en su sitio; los
    /// nombres reservados (`help`, el resto posicional) o vacíos se ignoran.
    /// Devuelve si el flag quedó declarado.
    fn declare(
        &mut self,
        arg: Arg,
        name: &str,
        kind: FlagKind,
        default: Option<String>,
        usage: &str,
        binder: Binder,
    ) -> bool {
        if name.is_empty()
            || name.starts_with('-')
            || name == HELP_FLAG
            || name == RESIDUAL_ARGS_ID
        {
            log::warn!("Nombre de flag reservado o inválido en '{}': '{}'", self.name, name);
            return false;
        }

        let info = FlagInfo {
            name: name.to_string(),
            kind,
            default,
            usage: usage.to_string(),
        };
        match self.flags.iter().position(|f| f.name == name) {
            Some(i) => {
                log::debug!("Redeclarando el flag '--{}' de '{}'.", name, self.name);
                self.args[i] = arg;
                self.flags[i] = info;
                self.binders[i] = binder;
            }
            None => {
                self.args.push(arg);
                self.flags.push(info);
                self.binders.push(binder);
            }
        }
        true
    }

    // --- PARSEO ---

    fn command(&self) -> Command {
        let help = Arg::new(HELP_FLAG)
            .short(HELP_SHORT)
            .long(HELP_FLAG)
            .action(ArgAction::SetTrue)
            .help("Muestra la ayuda del comando");
        let residual = Arg::new(RESIDUAL_ARGS_ID)
            .value_name("args")
            .num_args(0..)
            .trailing_var_arg(true);

        Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(help)
            .args(self.args.iter().cloned())
            .arg(residual)
    }

    /// Parsea los tokens, rellena los almacenamientos de los flags y separa el resto posicional.
    pub fn parse(&self, tokens: &[String]) -> FlagResult<ParsedFlags> {
        log::debug!("Parseando flags de '{}': {:?}", self.name, tokens);
        let matches = self.command().try_get_matches_from(tokens.to_vec())?;

        for bind in &self.binders {
            bind(&matches)?;
        }

        let set = self
            .flags
            .iter()
            .filter(|f| matches.value_source(&f.name) == Some(ValueSource::CommandLine))
            .map(|f| f.name.clone())
            .collect();
        let residual = matches
            .get_many::<String>(RESIDUAL_ARGS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(ParsedFlags {
            set,
            residual,
            help: matches.get_flag(HELP_FLAG),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_passed() {
        let mut fs = FlagSet::new("demo");
        let verbose = fs.bool("verbose", false, "Salida detallada");
        let name = fs.string("name", "origin", "Nombre del remoto");
        let depth = fs.value("depth", 3u32, "Profundidad");

        let parsed = fs.parse(&[]).unwrap();
        assert!(!verbose.get());
        assert_eq!(name.get(), "origin");
        assert_eq!(depth.get(), 3);
        assert!(parsed.set_flags().is_empty());
        assert!(parsed.residual().is_empty());
    }

    #[test]
    fn values_are_stored_and_reported_as_set() {
        let mut fs = FlagSet::new("demo");
        let verbose = fs.bool("verbose", false, "");
        let name = fs.string("name", "origin", "");
        let depth = fs.value("depth", 3u32, "");

        let parsed = fs
            .parse(&tokens(&["--name=upstream", "--depth", "7", "--verbose"]))
            .unwrap();
        assert!(verbose.get());
        assert_eq!(name.get(), "upstream");
        assert_eq!(depth.get(), 7);
        assert_eq!(parsed.set_flags(), ["verbose", "name", "depth"]);
    }

    #[test]
    fn explicit_default_value_still_counts_as_set() {
        let mut fs = FlagSet::new("demo");
        fs.string("name", "origin", "");

        let parsed = fs.parse(&tokens(&["--name", "origin"])).unwrap();
        assert!(parsed.was_set("name"));
    }

    #[test]
    fn bool_accepts_explicit_false() {
        let mut fs = FlagSet::new("demo");
        let shared = Flag::new(true);
        fs.bool_var(&shared, "color", true, "");

        fs.parse(&tokens(&["--color=false"])).unwrap();
        assert!(!shared.get());
    }

    #[test]
    fn parsing_stops_at_first_positional() {
        let mut fs = FlagSet::new("remote");
        let verbose = fs.bool("v", false, "");

        let parsed = fs
            .parse(&tokens(&["-v", "add", "--name", "x", "http://x"]))
            .unwrap();
        assert!(verbose.get());
        assert_eq!(parsed.residual(), ["add", "--name", "x", "http://x"]);
    }

    #[test]
    fn double_dash_ends_flag_parsing() {
        let mut fs = FlagSet::new("echo");
        let upper = fs.bool("upper", false, "");

        let parsed = fs.parse(&tokens(&["--", "--upper"])).unwrap();
        assert!(!upper.get());
        assert_eq!(parsed.residual(), ["--upper"]);
    }

    #[test]
    fn help_flag_is_builtin_and_not_listed() {
        let mut fs = FlagSet::new("demo");
        fs.bool("verbose", false, "");

        let parsed = fs.parse(&tokens(&["-h"])).unwrap();
        assert!(parsed.help_requested());
        assert_eq!(fs.flags().len(), 1);
        assert!(fs.lookup(HELP_FLAG).is_none());
    }

    #[test]
    fn unknown_flag_is_a_parse_error() {
        let fs = FlagSet::new("demo");
        let err = fs.parse(&tokens(&["--bogus"])).unwrap_err();
        assert!(matches!(err, FlagError::Parse(_)));
    }

    #[test]
    fn unparsable_value_names_the_flag() {
        let mut fs = FlagSet::new("demo");
        fs.value("depth", 3u32, "");

        let err = fs.parse(&tokens(&["--depth=muchos"])).unwrap_err();
        match err {
            FlagError::InvalidValue { flag, value, .. } => {
                assert_eq!(flag, "depth");
                assert_eq!(value, "muchos");
            }
            other => panic!("se esperaba InvalidValue, se obtuvo {other:?}"),
        }
    }

    #[test]
    fn listing_keeps_declaration_order_and_defaults() {
        let mut fs = FlagSet::new("demo");
        fs.string("sep", " ", "Separador");
        fs.bool("upper", false, "Mayúsculas");
        fs.string("empty", "", "Sin valor por defecto");

        let rows: Vec<_> = fs
            .flags()
            .iter()
            .map(|f| (f.name.as_str(), f.kind, f.default.as_deref()))
            .collect();
        assert_eq!(
            rows,
            [
                ("sep", FlagKind::Value, Some(" ")),
                ("upper", FlagKind::Bool, None),
                ("empty", FlagKind::Value, None),
            ]
        );
    }

    #[test]
    fn bool_default_true_survives_parse_and_is_listed() {
        let mut fs = FlagSet::new("demo");
        let color = Flag::new(false);
        fs.bool_var(&color, "color", true, "Colorea la salida");
        let quiet = fs.bool("quiet", false, "");

        let parsed = fs.parse(&[]).unwrap();
        assert!(color.get());
        assert!(!quiet.get());
        assert!(parsed.set_flags().is_empty());
        assert_eq!(fs.lookup("color").unwrap().default.as_deref(), Some("true"));
        assert_eq!(fs.lookup("quiet").unwrap().default, None);

        fs.parse(&tokens(&["--color=false"])).unwrap();
        assert!(!color.get());
    }

    #[test]
    fn redeclared_flag_replaces_the_previous_one() {
        let mut fs = FlagSet::new("demo");
        let first = fs.bool("a", false, "Primero");
        fs.string("sep", " ", "");
        let second = fs.string("a", "x", "Segundo");

        let names: Vec<_> = fs.flags().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "sep"]);
        assert_eq!(fs.lookup("a").unwrap().kind, FlagKind::Value);
        assert_eq!(fs.lookup("a").unwrap().usage, "Segundo");

        let parsed = fs.parse(&tokens(&["-a", "y"])).unwrap();
        assert_eq!(second.get(), "y");
        assert!(!first.get());
        assert_eq!(parsed.set_flags(), ["a"]);
    }

    #[test]
    fn reserved_names_are_ignored() {
        let mut fs = FlagSet::new("demo");
        let help = fs.bool("help", false, "");
        let residual = fs.string(RESIDUAL_ARGS_ID, "", "");
        fs.bool("", false, "");

        assert!(fs.flags().is_empty());
        let parsed = fs.parse(&tokens(&["--help"])).unwrap();
        assert!(parsed.help_requested());
        assert!(!help.get());
        assert_eq!(residual.get(), "");
    }
}
