//! Statut affiché d'un service (écran TC360) en fonction de l'heure courante.
//!
//! Aucune branche temporelle ne bloque le pointage : un service expiré reste
//! pointable ou déclarable non assuré a posteriori.

use crate::model::{Service, StatutService};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatutKind {
    Pending,
    Ready,
    Late,
    Expired,
    NonAssured,
    Completed,
}

impl StatutKind {
    pub fn label(self) -> &'static str {
        match self {
            StatutKind::Pending => "À venir",
            StatutKind::Ready => "À pointer",
            StatutKind::Late => "Passé",
            StatutKind::Expired => "Expiré",
            StatutKind::NonAssured => "Non assuré",
            StatutKind::Completed => "Terminée",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StatutKind::Pending => "blue",
            StatutKind::Ready => "green",
            StatutKind::Late => "orange",
            StatutKind::Expired => "red",
            StatutKind::NonAssured => "gray",
            StatutKind::Completed => "purple",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatutAffiche {
    pub kind: StatutKind,
    pub label: &'static str,
    pub color: &'static str,
    pub can_pointage: bool,
}

impl StatutAffiche {
    fn of(kind: StatutKind, can_pointage: bool) -> Self {
        Self {
            kind,
            label: kind.label(),
            color: kind.color(),
            can_pointage,
        }
    }
}

/// Retard constaté au moment du pointage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Retard {
    pub is_late: bool,
    pub late_minutes: u32,
}

/// Minutes (fractionnaires) entre `now` et le début du service, pris à la date de `now`.
pub fn minutes_avant_debut(service: &Service, now: NaiveDateTime) -> f64 {
    let start_secs = i64::from(service.heure_debut.minutes()) * 60;
    let debut = now.date().and_time(NaiveTime::MIN) + Duration::seconds(start_secs);
    (debut - now).num_milliseconds() as f64 / 60_000.0
}

/// Partition temporelle : `>= 20` à venir, `[0, 20)` à pointer, `(-60, 0)` passé, `<= -60` expiré.
pub fn classify_minutes(minutes_diff: f64) -> StatutKind {
    if minutes_diff >= 20.0 {
        StatutKind::Pending
    } else if minutes_diff >= 0.0 {
        StatutKind::Ready
    } else if minutes_diff > -60.0 {
        StatutKind::Late
    } else {
        StatutKind::Expired
    }
}

pub fn classify(service: &Service, now: NaiveDateTime) -> StatutAffiche {
    match service.statut {
        StatutService::NonAssure => return StatutAffiche::of(StatutKind::NonAssured, false),
        StatutService::Terminee => return StatutAffiche::of(StatutKind::Completed, false),
        StatutService::Planifiee => {}
    }
    let kind = classify_minutes(minutes_avant_debut(service, now));
    StatutAffiche::of(kind, true)
}

/// Retard à enregistrer si le service est pointé à `now`.
pub fn retard(service: &Service, now: NaiveDateTime) -> Retard {
    let diff = minutes_avant_debut(service, now);
    if diff < 0.0 {
        Retard {
            is_late: true,
            late_minutes: diff.abs().round() as u32,
        }
    } else {
        Retard::default()
    }
}
