// src/system/compgen.rs

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::system::executor;
use crate::system::flagset::FlagSet;

/// Produce candidatos para una palabra a medio escribir.
pub type Generator = Box<dyn Fn(&str) -> Vec<String>>;

/// Algo capaz de completar una lista de argumentos posicionales.
///
/// `args` son las palabras ya escritas; si `inword` es cierto, la última es la
/// palabra que se está completando.
pub trait ArgsGen {
    fn args_gen(&mut self, args: &[String], inword: bool) -> Vec<String>;
}

impl<F> ArgsGen for F
where
    F: FnMut(&[String], bool) -> Vec<String>,
{
    fn args_gen(&mut self, args: &[String], inword: bool) -> Vec<String> {
        self(args, inword)
    }
}

/// Devuelve la posición de la palabra que se completa y lo que ya se ha escrito de ella.
pub fn prefix(args: &[String], inword: bool) -> (usize, &str) {
    match args.last() {
        Some(last) if inword => (args.len() - 1, last.as_str()),
        _ => (args.len(), ""),
    }
}

// --- GENERADORES ---

/// Candidatos de una lista fija, filtrados por prefijo y ordenados.
pub fn values<I, S>(vals: I) -> Generator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut vals: Vec<String> = vals.into_iter().map(Into::into).collect();
    vals.sort();
    vals.dedup();
    Box::new(move |prefix| {
        vals.iter()
            .filter(|v| v.starts_with(prefix))
            .cloned()
            .collect()
    })
}

/// Archivos y directorios relativos al prefijo.
pub fn files() -> Generator {
    Box::new(|prefix| list_dir(prefix, false))
}

/// Solo directorios.
pub fn directories() -> Generator {
    Box::new(|prefix| list_dir(prefix, true))
}

/// Las líneas que imprime un comando de shell, filtradas por prefijo.
pub fn command_output(command_line: &str) -> Generator {
    let command_line = command_line.to_string();
    Box::new(move |prefix| match executor::capture_lines(&command_line) {
        Ok(lines) => lines.into_iter().filter(|l| l.starts_with(prefix)).collect(),
        Err(e) => {
            log::warn!("Generador de autocompletado fallido: {}", e);
            Vec::new()
        }
    })
}

fn list_dir(prefix: &str, dirs_only: bool) -> Vec<String> {
    let (dir, name_prefix) = match prefix.rfind('/') {
        Some(i) => (&prefix[..=i], &prefix[i + 1..]),
        None => ("", prefix),
    };
    let read_from = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };

    let entries = match fs::read_dir(read_from) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("No se pudo listar {:?} para autocompletar: {}", read_from, e);
            return Vec::new();
        }
    };

    let mut candidates: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(name_prefix) {
                return None;
            }
            // Los ocultos solo aparecen si el usuario ya escribió el punto.
            if name.starts_with('.') && !name_prefix.starts_with('.') {
                return None;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if dirs_only && !is_dir {
                return None;
            }
            Some(if is_dir {
                format!("{dir}{name}/")
            } else {
                format!("{dir}{name}")
            })
        })
        .collect();
    candidates.sort();
    candidates
}

// --- TERMINATOR ---

#[derive(Debug, Clone)]
struct FlagSpec {
    name: String,
    takes_value: bool,
}

/// Dónde queda el cursor tras recorrer las palabras ya completas.
enum Scan<'a> {
    /// Aún se aceptan flags.
    Flags,
    /// La palabra anterior es un flag que espera valor.
    AwaitingValue(&'a str),
    /// Ya empezaron los posicionales; aquí están los escritos hasta ahora.
    Positional(Vec<String>),
}

/// La superficie de autocompletado de un comando.
///
/// Conoce los flags de su `FlagSet`, las estrategias registradas para sus valores
/// y, opcionalmente, un generador para los argumentos posicionales.
pub struct Terminator {
    flags: Vec<FlagSpec>,
    strategies: HashMap<String, Generator>,
    positional: Option<Generator>,
}

impl Terminator {
    pub fn new(fs: &FlagSet) -> Self {
        Self {
            flags: fs
                .flags()
                .iter()
                .map(|f| FlagSpec {
                    name: f.name.clone(),
                    takes_value: f.takes_value(),
                })
                .collect(),
            strategies: HashMap::new(),
            positional: None,
        }
    }

    /// Registra la estrategia que completa los valores de un flag.
    pub fn flag(&mut self, name: &str, generator: Generator) {
        if !self.flags.iter().any(|f| f.name == name) {
            log::warn!("Estrategia de autocompletado para un flag no declarado: '--{}'", name);
        }
        self.strategies.insert(name.to_string(), generator);
    }

    /// Registra el generador de los argumentos posicionales.
    pub fn positional(&mut self, generator: Generator) {
        self.positional = Some(generator);
    }

    pub fn complete(&self, args: &[String], inword: bool) -> Vec<String> {
        self.complete_with(args, inword, None)
    }

    /// Completa `args` (los tokens que siguen al nombre del comando). Los posicionales
    /// se delegan en `nested` si se da; si no, en el generador posicional propio.
    pub fn complete_with(
        &self,
        args: &[String],
        inword: bool,
        nested: Option<&mut dyn ArgsGen>,
    ) -> Vec<String> {
        let (pos, prefix) = prefix(args, inword);
        log::debug!("Autocompletando posición {} con prefijo '{}'", pos, prefix);

        match self.scan(&args[..pos]) {
            Scan::Positional(mut words) => {
                if inword {
                    words.push(prefix.to_string());
                }
                return self.positional_candidates(&words, inword, nested);
            }
            Scan::AwaitingValue(name) => return self.value_candidates(name, prefix),
            Scan::Flags => {}
        }

        if let Some(body) = prefix.strip_prefix("--")
            && let Some((name, value_prefix)) = body.split_once('=')
        {
            return self
                .value_candidates(name, value_prefix)
                .into_iter()
                .map(|v| format!("--{name}={v}"))
                .collect();
        }
        if prefix.starts_with('-') {
            return self.flag_candidates(prefix);
        }

        let words = if inword {
            vec![prefix.to_string()]
        } else {
            Vec::new()
        };
        self.positional_candidates(&words, inword, nested)
    }

    fn scan<'a>(&self, done: &'a [String]) -> Scan<'a> {
        let mut i = 0;
        while i < done.len() {
            let token = &done[i];
            if token == "--" {
                return Scan::Positional(done[i + 1..].to_vec());
            }
            if token.len() > 1 && token.starts_with('-') {
                let name = token.trim_start_matches('-');
                if !name.contains('=')
                    && let Some(spec) = self.lookup(name)
                    && spec.takes_value
                {
                    if i + 1 == done.len() {
                        return Scan::AwaitingValue(name);
                    }
                    i += 2;
                    continue;
                }
                i += 1;
                continue;
            }
            return Scan::Positional(done[i..].to_vec());
        }
        Scan::Flags
    }

    fn lookup(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    fn flag_candidates(&self, prefix: &str) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .flags
            .iter()
            .map(|f| format!("--{}", f.name))
            .filter(|spelling| spelling.starts_with(prefix))
            .collect();
        candidates.sort();
        candidates
    }

    fn value_candidates(&self, name: &str, prefix: &str) -> Vec<String> {
        self.strategies
            .get(name)
            .map(|generator| generator(prefix))
            .unwrap_or_default()
    }

    fn positional_candidates(
        &self,
        words: &[String],
        inword: bool,
        nested: Option<&mut dyn ArgsGen>,
    ) -> Vec<String> {
        if let Some(nested) = nested {
            return nested.args_gen(words, inword);
        }
        match &self.positional {
            Some(generator) => generator(prefix(words, inword).1),
            None => Vec::new(),
        }
    }
}
