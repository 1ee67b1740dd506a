// src/bin/cmdtree.rs

use anyhow::{Result, anyhow};
use std::{env, fs, process};

use cmdtree::core::entry::program_name;
use cmdtree::system::compgen;
use cmdtree::{Cmd, Commander, Completer, Flag, FlagSet, Flagger, Settings, Terminator};

/// El punto de entrada principal de la aplicación.
fn main() {
    // Inicializar el logger. Para ver los logs, ejecuta con `RUST_LOG=debug cmdtree ...`
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let settings = match Settings::load_for(&program_name(&argv)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut app = App::new();
    cmdtree::execute(&mut app, &argv, &settings);
}

/// Escribe en stdout salvo que se haya pedido `--quiet`.
fn say(quiet: &Flag<bool>, message: &str) {
    if !quiet.get() {
        println!("{}", message);
    }
}

// --- RAÍZ ---

/// La raíz: un despachador con un flag global `--quiet` compartido con los comandos.
struct App {
    commander: Commander,
    quiet: Flag<bool>,
}

impl App {
    fn new() -> Self {
        let quiet = Flag::new(false);
        let mut commander = Commander::new().with_help_command();
        commander.register(
            "version",
            "",
            "Muestra la versión",
            Version {
                quiet: quiet.clone(),
            },
        );
        commander.register(
            "echo",
            "<palabras>...",
            "Repite sus argumentos",
            Echo {
                quiet: quiet.clone(),
                upper: None,
                sep: None,
            },
        );
        commander.register(
            "ls",
            "[dir]",
            "Lista un directorio",
            Ls {
                quiet: quiet.clone(),
                all: None,
            },
        );
        commander.register("remote", "<comando>", "Gestiona remotos", Remote::new(&quiet));
        Self { commander, quiet }
    }
}

impl Cmd for App {
    fn run(&mut self, args: &[String]) -> Result<()> {
        Ok(self.commander.resolve(args, None)?)
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }

    fn as_commander(&mut self) -> Option<&mut Commander> {
        Some(&mut self.commander)
    }
}

impl Flagger for App {
    fn flags(&mut self, fs: &mut FlagSet) {
        fs.bool_var(&self.quiet, "quiet", false, "No escribe nada en la salida estándar");
    }
}

// --- COMANDOS SIMPLES ---

struct Version {
    quiet: Flag<bool>,
}

impl Cmd for Version {
    fn run(&mut self, args: &[String]) -> Result<()> {
        say(&self.quiet, &format!("cmdtree {}", env!("CARGO_PKG_VERSION")));
        if !args.is_empty() {
            log::debug!("'version' ignora sus argumentos: {:?}", args);
            say(&self.quiet, &format!("(argumentos ignorados: {})", args.join(" ")));
        }
        Ok(())
    }
}

struct Echo {
    quiet: Flag<bool>,
    upper: Option<Flag<bool>>,
    sep: Option<Flag<String>>,
}

impl Cmd for Echo {
    fn run(&mut self, args: &[String]) -> Result<()> {
        let sep = self.sep.as_ref().map(Flag::get).unwrap_or_else(|| " ".to_string());
        let mut line = args.join(&sep);
        if self.upper.as_ref().is_some_and(Flag::get) {
            line = line.to_uppercase();
        }
        say(&self.quiet, &line);
        Ok(())
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }
}

impl Flagger for Echo {
    fn flags(&mut self, fs: &mut FlagSet) {
        self.upper = Some(fs.bool("upper", false, "Convierte a mayúsculas"));
        self.sep = Some(fs.string("sep", " ", "Separador entre palabras"));
    }
}

struct Ls {
    quiet: Flag<bool>,
    all: Option<Flag<bool>>,
}

impl Cmd for Ls {
    fn run(&mut self, args: &[String]) -> Result<()> {
        let dir = args.first().map(String::as_str).unwrap_or(".");
        let show_hidden = self.all.as_ref().is_some_and(Flag::get);

        let mut names: Vec<String> = fs::read_dir(dir)
            .map_err(|e| anyhow!("No se pudo listar '{}': {}", dir, e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| show_hidden || !name.starts_with('.'))
            .collect();
        names.sort();

        for name in names {
            say(&self.quiet, &name);
        }
        Ok(())
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }

    fn as_completer(&mut self) -> Option<&mut dyn Completer> {
        Some(self)
    }
}

impl Flagger for Ls {
    fn flags(&mut self, fs: &mut FlagSet) {
        self.all = Some(fs.bool("all", false, "Incluye los archivos ocultos"));
    }
}

impl Completer for Ls {
    fn compgens(&mut self, term: &mut Terminator) {
        term.positional(compgen::directories());
    }
}

// --- REMOTE (DESPACHADOR ANIDADO) ---

/// `remote`: un despachador con su propio flag `--verbose`.
struct Remote {
    commander: Commander,
    verbose: Flag<bool>,
}

impl Remote {
    fn new(quiet: &Flag<bool>) -> Self {
        let verbose = Flag::new(false);
        let mut commander = Commander::new();
        commander.register(
            "add",
            "<url>",
            "Añade un remoto",
            RemoteAdd {
                quiet: quiet.clone(),
                verbose: verbose.clone(),
                name: None,
            },
        );
        commander.register(
            "set-url",
            "--name <nombre> <url>",
            "Cambia la URL de un remoto",
            RemoteSetUrl {
                quiet: quiet.clone(),
                name: None,
                push: None,
            },
        );
        commander.register(
            "remove",
            "<nombre>",
            "Elimina un remoto",
            RemoteRemove {
                quiet: quiet.clone(),
            },
        );
        Self { commander, verbose }
    }
}

impl Cmd for Remote {
    fn run(&mut self, args: &[String]) -> Result<()> {
        Ok(self.commander.resolve(args, None)?)
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }

    fn as_commander(&mut self) -> Option<&mut Commander> {
        Some(&mut self.commander)
    }
}

impl Flagger for Remote {
    fn flags(&mut self, fs: &mut FlagSet) {
        fs.bool_var(&self.verbose, "verbose", false, "Muestra más detalles");
    }
}

struct RemoteAdd {
    quiet: Flag<bool>,
    verbose: Flag<bool>,
    name: Option<Flag<String>>,
}

impl Cmd for RemoteAdd {
    fn run(&mut self, args: &[String]) -> Result<()> {
        let url = args
            .first()
            .ok_or_else(|| anyhow!("'remote add' requiere una URL."))?;
        let name = self.name.as_ref().map(Flag::get).unwrap_or_else(|| "origin".to_string());

        say(&self.quiet, &format!("Remoto '{}' -> {}", name, url));
        if self.verbose.get() {
            say(&self.quiet, &format!("  argumentos: {:?}", args));
        }
        Ok(())
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }

    fn as_completer(&mut self) -> Option<&mut dyn Completer> {
        Some(self)
    }
}

impl Flagger for RemoteAdd {
    fn flags(&mut self, fs: &mut FlagSet) {
        self.name = Some(fs.string("name", "origin", "Nombre del remoto"));
    }
}

impl Completer for RemoteAdd {
    fn compgens(&mut self, term: &mut Terminator) {
        term.flag("name", compgen::values(["origin", "upstream"]));
        term.positional(compgen::values(["https://", "ssh://", "git@"]));
    }
}

struct RemoteSetUrl {
    quiet: Flag<bool>,
    name: Option<Flag<String>>,
    push: Option<Flag<bool>>,
}

impl Cmd for RemoteSetUrl {
    fn run(&mut self, args: &[String]) -> Result<()> {
        let url = args
            .first()
            .ok_or_else(|| anyhow!("'remote set-url' requiere una URL."))?;
        let name = self.name.as_ref().map(Flag::get).unwrap_or_default();
        let kind = if self.push.as_ref().is_some_and(Flag::get) {
            "push"
        } else {
            "fetch"
        };
        say(&self.quiet, &format!("Remoto '{}' ({}) -> {}", name, kind, url));
        Ok(())
    }

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        Some(self)
    }
}

impl Flagger for RemoteSetUrl {
    fn flags(&mut self, fs: &mut FlagSet) {
        self.name = Some(fs.string("name", "", "Nombre del remoto"));
        self.push = Some(fs.bool("push", false, "Cambia la URL de push"));
    }

    fn required_flags(&self) -> &[&str] {
        &["name"]
    }
}

struct RemoteRemove {
    quiet: Flag<bool>,
}

impl Cmd for RemoteRemove {
    fn run(&mut self, args: &[String]) -> Result<()> {
        let name = args
            .first()
            .ok_or_else(|| anyhow!("'remote remove' requiere el nombre del remoto."))?;
        say(&self.quiet, &format!("Remoto '{}' eliminado", name));
        Ok(())
    }

    fn as_completer(&mut self) -> Option<&mut dyn Completer> {
        Some(self)
    }
}

impl Completer for RemoteRemove {
    fn compgens(&mut self, term: &mut Terminator) {
        term.positional(compgen::command_output("git remote"));
    }
}
