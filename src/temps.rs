use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erreur de lecture d'une heure `HH:MM`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing ':' separator in time {0:?}")]
    MissingSeparator(String),
    #[error("non-numeric time component in {0:?}")]
    NotNumeric(String),
    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// Jour de fonctionnement d'un sens de ligne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourFonctionnement {
    Semaine,
    Samedi,
    DimancheFeries,
}

impl JourFonctionnement {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourFonctionnement::Semaine => "SEMAINE",
            JourFonctionnement::Samedi => "SAMEDI",
            JourFonctionnement::DimancheFeries => "DIMANCHE_FERIES",
        }
    }
}

/// `"HH:MM"` → minutes depuis minuit. Un suffixe `:SS` est toléré et ignoré.
pub fn to_minutes(hhmm: &str) -> Result<u32, ParseError> {
    let raw = hhmm.trim();
    let mut parts = raw.split(':');
    let hours = parts.next().unwrap_or_default();
    let minutes = parts
        .next()
        .ok_or_else(|| ParseError::MissingSeparator(raw.to_string()))?;
    let seconds = parts.next();
    if parts.next().is_some() {
        return Err(ParseError::NotNumeric(raw.to_string()));
    }

    let number = |s: &str| -> Result<u32, ParseError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::NotNumeric(raw.to_string()));
        }
        s.parse::<u32>()
            .map_err(|_| ParseError::NotNumeric(raw.to_string()))
    };

    let h = number(hours)?;
    let m = number(minutes)?;
    if let Some(s) = seconds {
        number(s)?;
    }
    if h > 23 || m > 59 {
        return Err(ParseError::OutOfRange(raw.to_string()));
    }
    Ok(h * 60 + m)
}

/// Durée en heures entre deux heures `HH:MM` du même jour.
///
/// Négative si `end < start` : les services de nuit ne sont pas modélisés.
pub fn duree_heures(start: &str, end: &str) -> Result<f64, ParseError> {
    let start = i64::from(to_minutes(start)?);
    let end = i64::from(to_minutes(end)?);
    Ok((end - start) as f64 / 60.0)
}

/// Classe une date en jour de fonctionnement. Les jours fériés ne sont pas détectés.
pub fn jour_fonctionnement(date: NaiveDate) -> JourFonctionnement {
    match date.weekday() {
        Weekday::Sat => JourFonctionnement::Samedi,
        Weekday::Sun => JourFonctionnement::DimancheFeries,
        _ => JourFonctionnement::Semaine,
    }
}

/// Bornes (lundi, dimanche) de la semaine ISO contenant `date`.
pub fn semaine_iso(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let lundi = date - Duration::days(offset);
    (lundi, lundi + Duration::days(6))
}

/// Nom du jour en français, minuscule (clé des calendriers de ligne).
pub fn jour_francais(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "lundi",
        Weekday::Tue => "mardi",
        Weekday::Wed => "mercredi",
        Weekday::Thu => "jeudi",
        Weekday::Fri => "vendredi",
        Weekday::Sat => "samedi",
        Weekday::Sun => "dimanche",
    }
}

pub fn format_minutes(mins: u32) -> String {
    format!("{:02}:{:02}", mins / 60, mins % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_suffix_is_ignored() {
        assert_eq!(to_minutes("08:15:00"), Ok(495));
        assert!(to_minutes("08:15:00:00").is_err());
    }

    #[test]
    fn rejects_blank_components() {
        assert_eq!(
            to_minutes(":30"),
            Err(ParseError::NotNumeric(":30".to_string()))
        );
        assert!(to_minutes("12:").is_err());
        assert!(to_minutes("-1:30").is_err());
    }
}
