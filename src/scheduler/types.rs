use crate::model::{ConducteurId, NumeroParc, ServiceId};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Règles d'affectation d'un conducteur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignOptions {
    /// Repos minimal entre deux services du même jour.
    pub min_rest_minutes: i64,
    /// Plafond hebdomadaire (semaine ISO), bornes incluses.
    pub weekly_cap_minutes: i64,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            min_rest_minutes: 12 * 60,
            weekly_cap_minutes: 44 * 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    Overlap,
    RestViolation,
    WeeklyCap,
    UnknownService,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::Overlap => "overlap",
            ConflictKind::RestViolation => "rest",
            ConflictKind::WeeklyCap => "weekly-cap",
            ConflictKind::UnknownService => "unknown-service",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub conducteur: ConducteurId,
    pub service: ServiceId,
    /// Service en conflit (absent pour le plafond hebdomadaire).
    pub other: Option<ServiceId>,
    pub kind: ConflictKind,
    /// Lundi de la semaine concernée, pour le plafond hebdomadaire.
    pub semaine: Option<NaiveDate>,
    /// Total de la semaine en minutes, pour le plafond hebdomadaire.
    pub total_minutes: Option<i64>,
}

impl Conflict {
    pub(super) fn pair(
        conducteur: &ConducteurId,
        service: &ServiceId,
        other: &ServiceId,
        kind: ConflictKind,
    ) -> Self {
        Self {
            conducteur: conducteur.clone(),
            service: service.clone(),
            other: Some(other.clone()),
            kind,
            semaine: None,
            total_minutes: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown service: {0}")]
    UnknownService(String),
    #[error("unknown conducteur: {0}")]
    UnknownConducteur(String),
    #[error("unknown vehicule: {0}")]
    UnknownVehicule(NumeroParc),
    #[error("assignment refused ({}) for service {}", .0.kind.as_str(), .0.service)]
    Conflict(Box<Conflict>),
    #[error("validation: {0}")]
    Validation(&'static str),
    #[error("clock drift detected ({0}s): mutations disabled")]
    DegradedMode(i64),
}
