// src/core/capabilities.rs

use crate::core::commander::Commander;
use crate::system::compgen::Terminator;
use crate::system::flagset::FlagSet;

/// Un subcomando ejecutable. Es lo único obligatorio para registrarse.
///
/// Las otras tres capacidades son opcionales e independientes entre sí: un comando
/// las expone devolviendo `Some(self)` (o el campo que las implementa) desde el
/// accesor correspondiente. Un comando que solo sabe ejecutarse no escribe nada más.
pub trait Cmd {
    /// Ejecuta el comando con los argumentos posicionales que sobraron tras sus flags.
    fn run(&mut self, args: &[String]) -> anyhow::Result<()>;

    fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
        None
    }

    fn as_completer(&mut self) -> Option<&mut dyn Completer> {
        None
    }

    /// Si el comando es a su vez un despachador, su `Commander`.
    fn as_commander(&mut self) -> Option<&mut Commander> {
        None
    }
}

/// Configura los flags de un comando antes del parseo.
pub trait Flagger {
    fn flags(&mut self, fs: &mut FlagSet);

    /// Flags que el usuario debe escribir siempre. Solo se comprueba su presencia.
    fn required_flags(&self) -> &[&str] {
        &[]
    }
}

/// Configura las estrategias de autocompletado de un comando.
pub trait Completer {
    fn compgens(&mut self, term: &mut Terminator);
}

/// Qué capacidades opcionales expone un comando.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub flags: bool,
    pub completion: bool,
    pub nested: bool,
}

impl Capabilities {
    /// Consulta un comando. Nunca falla: la ausencia de una capacidad es lo normal.
    pub fn of(cmd: &mut dyn Cmd) -> Self {
        Self {
            flags: cmd.as_flagger().is_some(),
            completion: cmd.as_completer().is_some(),
            nested: cmd.as_commander().is_some(),
        }
    }
}

/// Los flags obligatorios de un comando, si los declara.
pub fn required_flags(cmd: &mut dyn Cmd) -> Vec<String> {
    cmd.as_flagger()
        .map(|f| f.required_flags().iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Cmd for Plain {
        fn run(&mut self, _args: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct WithFlags;

    impl Cmd for WithFlags {
        fn run(&mut self, _args: &[String]) -> anyhow::Result<()> {
            Ok(())
        }

        fn as_flagger(&mut self) -> Option<&mut dyn Flagger> {
            Some(self)
        }

        fn as_completer(&mut self) -> Option<&mut dyn Completer> {
            Some(self)
        }
    }

    impl Flagger for WithFlags {
        fn flags(&mut self, fs: &mut FlagSet) {
            fs.bool("a", false, "");
        }

        fn required_flags(&self) -> &[&str] {
            &["a", "b"]
        }
    }

    impl Completer for WithFlags {
        fn compgens(&mut self, _term: &mut Terminator) {}
    }

    #[test]
    fn runnable_only_command_exposes_nothing() {
        assert_eq!(Capabilities::of(&mut Plain), Capabilities::default());
        assert!(required_flags(&mut Plain).is_empty());
    }

    #[test]
    fn capabilities_are_detected_independently() {
        let caps = Capabilities::of(&mut WithFlags);
        assert_eq!(
            caps,
            Capabilities {
                flags: true,
                completion: true,
                nested: false
            }
        );
        assert_eq!(required_flags(&mut WithFlags), ["a", "b"]);
    }

    #[test]
    fn a_commander_is_nested() {
        let mut commander = Commander::new();
        assert!(Capabilities::of(&mut commander).nested);
    }
}
