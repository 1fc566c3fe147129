use chrono::{DateTime, SubsecRound, Utc};

/// Fuente del instante usado en `creadoEn` / `actualizadoEn` de las semillas.
///
/// `Fixed` permite que dos corridas produzcan exactamente los mismos valores.
/// El instante se trunca a microsegundos, la precisión de `TIMESTAMPTZ`, para
/// que ambos backends guarden el mismo valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedClock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl SeedClock {
    pub fn now(&self) -> DateTime<Utc> {
        let at = match self {
            SeedClock::System => Utc::now(),
            SeedClock::Fixed(at) => *at,
        };
        at.trunc_subsecs(6)
    }
}
