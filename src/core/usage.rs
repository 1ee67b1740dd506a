// src/core/usage.rs

use crate::constants::HELP_COMMAND;
use crate::core::capabilities::{Cmd, required_flags};
use crate::core::commander::Commander;
use crate::system::flagset::FlagSet;

/// Separación mínima entre columnas.
const COLUMN_PADDING: usize = 2;

/// El uso de un despachador: sus subcomandos ordenados por nombre, sus flags
/// (si tiene) y la pista para pedir la ayuda de cada subcomando.
pub fn commander_usage(commander: &Commander, fs: Option<&FlagSet>) -> String {
    let name = commander.name();
    let mut out = format!("Uso: {} <comando>\n\ndonde <comando> es uno de:\n", name);

    let mut rows: Vec<Vec<&str>> = commander
        .records()
        .map(|r| vec![r.name.as_str(), r.syntax.as_str(), r.description.as_str()])
        .collect();
    if commander.offers_help_command() {
        rows.push(vec![HELP_COMMAND, "[comando]", "Muestra la ayuda de un comando"]);
    }
    rows.sort_by(|a, b| a[0].cmp(b[0]));
    out.push_str(&columns(&rows));

    if let Some(fs) = fs
        && !fs.flags().is_empty()
    {
        out.push_str("\nflags disponibles:\n");
        out.push_str(&flag_defaults(fs));
    }

    out.push_str(&format!(
        "\n{} <comando> -h para la ayuda de cada subcomando\n",
        name
    ));
    out
}

/// El uso de un comando hoja: sus flags y, si los hay, los obligatorios.
pub fn subcommand_usage(qname: &str, fs: &FlagSet, required: &[String]) -> String {
    let mut out = format!("Uso de {}:\n", qname);
    if fs.flags().is_empty() {
        out.push_str("  (sin flags)\n");
    } else {
        out.push_str(&flag_defaults(fs));
    }
    out.push_str(&required_section(required));
    out
}

/// El uso que corresponde a un comando concreto, sea hoja o despachador.
pub fn command_usage(cmd: &mut dyn Cmd, qname: &str, fs: &FlagSet) -> String {
    let required = required_flags(cmd);
    match cmd.as_commander() {
        Some(commander) if !commander.is_empty() => {
            let mut out = commander_usage(commander, Some(fs));
            out.push_str(&required_section(&required));
            out
        }
        _ => subcommand_usage(qname, fs, &required),
    }
}

fn required_section(required: &[String]) -> String {
    if required.is_empty() {
        return String::new();
    }
    format!("\nflags obligatorios:\n  {}\n", required.join(", "))
}

/// Los flags con su descripción y su valor por defecto, en columnas.
pub fn flag_defaults(fs: &FlagSet) -> String {
    let rendered: Vec<(String, String)> = fs
        .flags()
        .iter()
        .map(|f| {
            let spelling = if f.takes_value() {
                format!("{} <valor>", f.spelling())
            } else {
                f.spelling()
            };
            let description = match &f.default {
                Some(default) => format!("{} (por defecto: {:?})", f.usage, default),
                None => f.usage.clone(),
            };
            (spelling, description)
        })
        .collect();
    let rows: Vec<Vec<&str>> = rendered
        .iter()
        .map(|(s, d)| vec![s.as_str(), d.as_str()])
        .collect();
    columns(&rows)
}

/// Alinea filas en columnas, con dos espacios de sangría. La última columna no se rellena.
fn columns(rows: &[Vec<&str>]) -> String {
    let count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; count];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let mut line = String::from("  ");
        for (i, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < row.len() {
                let fill = widths[i] - cell.chars().count() + COLUMN_PADDING;
                line.push_str(&" ".repeat(fill));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Cmd for Noop {
        fn run(&mut self, _args: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn commander() -> Commander {
        let mut c = Commander::new();
        c.set_path("git");
        c.register("status", "", "Muestra el estado", Noop);
        c.register("remote", "<comando>", "Gestiona remotos", Noop);
        c.register("add", "<ruta>...", "Añade archivos", Noop);
        c
    }

    #[test]
    fn commands_are_sorted_and_aligned() {
        let usage = commander_usage(&commander(), None);
        let expected = "\
Uso: git <comando>

donde <comando> es uno de:
  add     <ruta>...  Añade archivos
  remote  <comando>  Gestiona remotos
  status             Muestra el estado

git <comando> -h para la ayuda de cada subcomando
";
        assert_eq!(usage, expected);
    }

    #[test]
    fn flags_section_only_when_the_commander_has_flags() {
        let c = commander();
        let empty = FlagSet::new("git");
        assert!(!commander_usage(&c, Some(&empty)).contains("flags disponibles"));

        let mut fs = FlagSet::new("git");
        fs.string("C", ".", "Directorio de trabajo");
        let usage = commander_usage(&c, Some(&fs));
        assert!(usage.contains("\nflags disponibles:\n  --C <valor>  Directorio de trabajo (por defecto: \".\")\n"));
    }

    #[test]
    fn subcommand_usage_lists_required_flags() {
        let mut fs = FlagSet::new("git remote set-url");
        fs.string("name", "", "Nombre del remoto");
        fs.bool("push", false, "Cambia la URL de push");

        let usage = subcommand_usage("git remote set-url", &fs, &["name".to_string()]);
        let expected = "\
Uso de git remote set-url:
  --name <valor>  Nombre del remoto
  --push          Cambia la URL de push

flags obligatorios:
  name
";
        assert_eq!(usage, expected);
    }

    #[test]
    fn subcommand_without_flags_says_so() {
        let fs = FlagSet::new("git status");
        assert_eq!(
            subcommand_usage("git status", &fs, &[]),
            "Uso de git status:\n  (sin flags)\n"
        );
    }

    #[test]
    fn command_usage_picks_the_commander_form_for_dispatchers() {
        let mut c = commander();
        let fs = FlagSet::new("git");
        assert!(command_usage(&mut c, "git", &fs).starts_with("Uso: git <comando>"));
        assert!(command_usage(&mut Noop, "git status", &fs).starts_with("Uso de git status:"));
    }

    #[test]
    fn help_command_is_listed_when_offered() {
        let usage = commander_usage(&commander().with_help_command(), None);
        let expected = "\
Uso: git <comando>

donde <comando> es uno de:
  add     <ruta>...  Añade archivos
  help    [comando]  Muestra la ayuda de un comando
  remote  <comando>  Gestiona remotos
  status             Muestra el estado

git <comando> -h para la ayuda de cada subcomando
";
        assert_eq!(usage, expected);
    }

    #[test]
    fn bool_defaults_are_shown_only_when_true() {
        let mut fs = FlagSet::new("ls");
        fs.bool("color", true, "Colorea la salida");
        fs.bool("all", false, "Incluye ocultos");
        assert_eq!(
            flag_defaults(&fs),
            "  --color  Colorea la salida (por defecto: \"true\")\n  --all    Incluye ocultos\n"
        );
    }
}
