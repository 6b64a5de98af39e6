use crate::model::{ConducteurId, ServiceId};
use serde::{Deserialize, Serialize};

/// Saisie du régulateur sur l'écran de pointage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointageDemande {
    /// Conducteur présent ; à défaut, celui affecté au service.
    pub conducteur_id: Option<ConducteurId>,
    pub vehicle_type: Option<String>,
    pub permis_checked: bool,
    pub chronometer_checked: bool,
}

/// Corps de `POST /api/pointages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pointage {
    pub service_id: ServiceId,
    pub conducteur_id: ConducteurId,
    pub validated_by: String,
    pub vehicle_type: Option<String>,
    pub permis_checked: bool,
    pub chronometer_checked: bool,
    pub is_late: bool,
    pub late_minutes: u32,
}

/// Corps de `PUT /api/services/:id/non-assured`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonAssurance {
    #[serde(rename = "motifNonAssurance")]
    pub motif: String,
    #[serde(default)]
    pub notes: String,
    pub marked_by: String,
}
