use super::{conflicts, Planning, SchedError};
use crate::horloge::EtatHorloge;
use crate::model::{ConducteurId, NumeroParc, Service, ServiceId, StatutService};
use crate::pointage::{NonAssurance, Pointage, PointageDemande};
use crate::statut;
use chrono::NaiveDateTime;
use tracing::{info, warn};

fn ensure_operational(planning: &Planning) -> Result<(), SchedError> {
    if let EtatHorloge::Degrade { ecart_secondes } = planning.horloge {
        warn!(ecart_secondes, "mutation refused while clock is drifting");
        return Err(SchedError::DegradedMode(ecart_secondes));
    }
    Ok(())
}

fn service_mut<'a>(
    planning: &'a mut Planning,
    id: &ServiceId,
) -> Result<&'a mut Service, SchedError> {
    planning
        .reseau
        .find_service_mut(id)
        .ok_or_else(|| SchedError::UnknownService(id.to_string()))
}

pub(super) fn assigner_conducteur(
    planning: &mut Planning,
    service_id: &ServiceId,
    conducteur_id: &ConducteurId,
) -> Result<(), SchedError> {
    ensure_operational(planning)?;
    if planning.reseau.find_service(service_id).is_none() {
        return Err(SchedError::UnknownService(service_id.to_string()));
    }
    if planning.reseau.find_conducteur(conducteur_id).is_none() {
        return Err(SchedError::UnknownConducteur(conducteur_id.to_string()));
    }

    let all = planning.reseau.services();
    conflicts::check_assignment(service_id, conducteur_id, &all, planning.opts)
        .map_err(|c| SchedError::Conflict(Box::new(c)))?;

    service_mut(planning, service_id)?.conducteur_id = Some(conducteur_id.clone());
    info!(service = %service_id, conducteur = %conducteur_id, "conducteur assigned");
    Ok(())
}

pub(super) fn desassigner_conducteur(
    planning: &mut Planning,
    service_id: &ServiceId,
) -> Result<(), SchedError> {
    ensure_operational(planning)?;
    service_mut(planning, service_id)?.conducteur_id = None;
    info!(service = %service_id, "conducteur unassigned");
    Ok(())
}

pub(super) fn assigner_vehicule(
    planning: &mut Planning,
    service_id: &ServiceId,
    parc: &NumeroParc,
) -> Result<(), SchedError> {
    ensure_operational(planning)?;
    // liste vide = parc non chargé, on laisse le serveur trancher
    if !planning.reseau.vehicules.is_empty() && planning.reseau.find_vehicule(parc).is_none() {
        return Err(SchedError::UnknownVehicule(parc.clone()));
    }
    service_mut(planning, service_id)?.vehicule_assigne = Some(parc.clone());
    info!(service = %service_id, parc = %parc, "vehicule assigned");
    Ok(())
}

pub(super) fn marquer_non_assure(
    planning: &mut Planning,
    service_id: &ServiceId,
    motif: NonAssurance,
) -> Result<(), SchedError> {
    ensure_operational(planning)?;
    if motif.motif.trim().is_empty() {
        return Err(SchedError::Validation("a non-assurance motif is required"));
    }
    let service = service_mut(planning, service_id)?;
    service.statut = StatutService::NonAssure;
    service.motif_non_assurance = Some(motif.motif.trim().to_string());
    info!(service = %service_id, marked_by = %motif.marked_by, "service marked non assuré");
    Ok(())
}

pub(super) fn pointer(
    planning: &mut Planning,
    service_id: &ServiceId,
    demande: PointageDemande,
    validated_by: &str,
    now: NaiveDateTime,
) -> Result<Pointage, SchedError> {
    ensure_operational(planning)?;
    let service = planning
        .reseau
        .find_service(service_id)
        .ok_or_else(|| SchedError::UnknownService(service_id.to_string()))?;

    if !statut::classify(service, now).can_pointage {
        return Err(SchedError::Validation(
            "service already completed or non assuré",
        ));
    }
    let conducteur_id = demande
        .conducteur_id
        .or_else(|| service.conducteur_id.clone())
        .ok_or(SchedError::Validation("no conducteur selected"))?;
    if !planning.reseau.conducteurs.is_empty()
        && planning.reseau.find_conducteur(&conducteur_id).is_none()
    {
        return Err(SchedError::UnknownConducteur(conducteur_id.to_string()));
    }
    if !demande.permis_checked || !demande.chronometer_checked {
        return Err(SchedError::Validation(
            "permis and chronometer checks are required",
        ));
    }
    // conducteur remplaçant : mêmes règles qu'une affectation
    if service.conducteur_id.as_ref() != Some(&conducteur_id) {
        let all = planning.reseau.services();
        conflicts::check_assignment(service_id, &conducteur_id, &all, planning.opts)
            .map_err(|c| SchedError::Conflict(Box::new(c)))?;
    }

    let vehicle_type = demande.vehicle_type.or_else(|| {
        service
            .vehicule_assigne
            .as_ref()
            .and_then(|parc| planning.reseau.find_vehicule(parc))
            .and_then(|v| v.type_vehicule.clone())
    });
    let retard = statut::retard(service, now);

    let pointage = Pointage {
        service_id: service_id.clone(),
        conducteur_id: conducteur_id.clone(),
        validated_by: validated_by.to_string(),
        vehicle_type,
        permis_checked: demande.permis_checked,
        chronometer_checked: demande.chronometer_checked,
        is_late: retard.is_late,
        late_minutes: retard.late_minutes,
    };

    let service = service_mut(planning, service_id)?;
    service.statut = StatutService::Terminee;
    service.conducteur_id = Some(conducteur_id);
    info!(
        service = %service_id,
        is_late = pointage.is_late,
        late_minutes = pointage.late_minutes,
        "service pointed"
    );
    Ok(pointage)
}

pub(super) fn supprimer_service(
    planning: &mut Planning,
    service_id: &ServiceId,
) -> Result<Service, SchedError> {
    ensure_operational(planning)?;
    let removed = planning
        .reseau
        .remove_service(service_id)
        .ok_or_else(|| SchedError::UnknownService(service_id.to_string()))?;
    info!(service = %service_id, "service deleted");
    Ok(removed)
}
