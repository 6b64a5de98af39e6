use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

/// Écart toléré (minutes) entre l'horloge locale et celle du serveur.
pub const DERIVE_MAX_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "etat", rename_all = "kebab-case")]
pub enum EtatHorloge {
    #[default]
    Synchronise,
    /// Mode dégradé : les actions de modification sont désactivées.
    Degrade { ecart_secondes: i64 },
}

impl EtatHorloge {
    pub fn is_degrade(&self) -> bool {
        matches!(self, EtatHorloge::Degrade { .. })
    }
}

pub fn verifier_derive(
    server: DateTime<Utc>,
    local: DateTime<Utc>,
    seuil: Duration,
) -> EtatHorloge {
    let ecart = server - local;
    if ecart.num_milliseconds().abs() > seuil.num_milliseconds() {
        EtatHorloge::Degrade {
            ecart_secondes: ecart.num_seconds(),
        }
    } else {
        EtatHorloge::Synchronise
    }
}

/// Délai jusqu'au prochain minuit local (rafraîchissements quotidiens).
pub fn duree_jusqu_a_minuit(now: NaiveDateTime) -> Duration {
    let demain = now.date() + Duration::days(1);
    demain.and_time(NaiveTime::MIN) - now
}
