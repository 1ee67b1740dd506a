// src/core/completion.rs

use crate::core::commander::{Commander, prepare};
use crate::system::compgen::{self, ArgsGen};

impl Commander {
    /// Produce candidatos de autocompletado para `args`, donde `args[0]` es el
    /// token que este despachador tendría que resolver.
    ///
    /// En la posición 0 se ofrecen los nombres registrados. Más adelante se busca
    /// el comando de `args[0]` (sin ejecutarlo) y se delega en su propia superficie
    /// de autocompletado, que a su vez recurre si el comando es otro despachador.
    /// Nunca falla: un comando desconocido simplemente no produce candidatos.
    pub fn compgen(&mut self, args: &[String], inword: bool) -> Vec<String> {
        let (pos, prefix) = compgen::prefix(args, inword);
        if pos == 0 {
            log::debug!("Completando nombre de comando en '{}' con '{}'", self.name(), prefix);
            return compgen::values(self.command_names())(prefix);
        }

        let first = &args[0];
        let qname = self.qualified(first);
        let Some(record) = self.record_mut(first) else {
            log::debug!("Sin candidatos: '{}' no es un comando registrado", first);
            return Vec::new();
        };

        let (_, term) = prepare(record.handler.as_mut(), &qname);
        let rest = &args[1..];
        match record.handler.as_commander() {
            Some(nested) if !nested.is_empty() => {
                term.complete_with(rest, inword, Some(nested as &mut dyn ArgsGen))
            }
            _ => term.complete(rest, inword),
        }
    }
}

impl ArgsGen for Commander {
    fn args_gen(&mut self, args: &[String], inword: bool) -> Vec<String> {
        self.compgen(args, inword)
    }
}
