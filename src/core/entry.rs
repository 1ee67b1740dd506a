// src/core/entry.rs

use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::config::{Settings, UsageStream};
use crate::core::capabilities::Cmd;
use crate::core::commander::{DispatchError, DispatchResult, launch, prepare};
use crate::system::compgen::ArgsGen;
use crate::system::flagset::FlagError;
use crate::system::shell;

/// El nombre con que se muestra la raíz: el nombre de archivo de `argv[0]`.
pub fn program_name(argv: &[String]) -> String {
    argv.first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Resuelve el vector de argumentos completo (programa incluido) contra la raíz.
pub fn dispatch(app: &mut dyn Cmd, argv: &[String]) -> DispatchResult<()> {
    let program = program_name(argv);
    log::debug!("Despachando {:?} como '{}'", argv, program);
    launch(app, &program, argv)
}

/// Candidatos de autocompletado para `args` (sin el programa), empezando por los
/// flags de la propia raíz.
pub fn complete(app: &mut dyn Cmd, program: &str, args: &[String], inword: bool) -> Vec<String> {
    let (_, term) = prepare(app, program);
    match app.as_commander() {
        Some(commander) => term.complete_with(args, inword, Some(commander as &mut dyn ArgsGen)),
        None => term.complete(args, inword),
    }
}

/// El punto de entrada del proceso.
///
/// Si la shell lo invoca para autocompletar, imprime los candidatos y termina.
/// Si no, despacha; cualquier fallo imprime el uso que corresponda y termina el
/// proceso con el código de fallo configurado.
pub fn execute(app: &mut dyn Cmd, argv: &[String], settings: &Settings) {
    if settings.completion {
        match shell::completion_request() {
            Ok(Some(request)) => {
                let program = program_name(argv);
                for candidate in complete(app, &program, &request.args, request.inword) {
                    println!("{}", candidate);
                }
                process::exit(0);
            }
            Ok(None) => {}
            Err(e) => {
                // Sin candidatos: la shell no debe ver errores al completar.
                log::warn!("Petición de autocompletado ignorada: {}", e);
                process::exit(0);
            }
        }
    }

    if let Err(err) = dispatch(app, argv) {
        report(err, settings);
    }
}

/// Informa de un fallo de despacho y termina el proceso.
fn report(err: DispatchError, settings: &Settings) -> ! {
    match err {
        // Los errores de sintaxis los presenta clap a su manera.
        DispatchError::MalformedFlag {
            source: FlagError::Parse(clap_err),
            ..
        } => clap_err.exit(),
        DispatchError::HelpRequested { usage, .. } => {
            emit(settings.usage_stream, &usage);
            process::exit(0);
        }
        DispatchError::Handler { .. } => {
            eprintln!("\nError: {:?}", anyhow::Error::from(err));
            process::exit(settings.failure_exit_code);
        }
        other => {
            log::debug!("Fallo de despacho: {:?}", other);
            let mut text = format!("Error: {}\n", other);
            if let Some(usage) = other.usage() {
                text.push('\n');
                text.push_str(usage);
            }
            emit(settings.usage_stream, &text);
            process::exit(settings.failure_exit_code);
        }
    }
}

fn emit(stream: UsageStream, text: &str) {
    let result = match stream {
        UsageStream::Stderr => io::stderr().lock().write_all(text.as_bytes()),
        UsageStream::Stdout => io::stdout().lock().write_all(text.as_bytes()),
    };
    if let Err(e) = result {
        log::warn!("No se pudo escribir el uso: {}", e);
    }
}
