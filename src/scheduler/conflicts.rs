use super::{util, AssignOptions, Conflict, ConflictKind};
use crate::model::{ConducteurId, Service, ServiceId};
use crate::temps;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Vérifie qu'un conducteur peut prendre un service, au vu de ses autres services.
///
/// Les comparaisons de chevauchement et de repos ne portent que sur les services du
/// même jour calendaire : un service finissant à 23:30 et un autre commençant à 00:15
/// le lendemain ne sont pas confrontés.
pub fn check_assignment(
    service_id: &ServiceId,
    conducteur_id: &ConducteurId,
    all: &[Service],
    opts: AssignOptions,
) -> Result<(), Conflict> {
    let Some(candidate) = util::find_service(all, service_id) else {
        debug!(service = %service_id, "unknown service, not assignable");
        return Err(Conflict {
            conducteur: conducteur_id.clone(),
            service: service_id.clone(),
            other: None,
            kind: ConflictKind::UnknownService,
            semaine: None,
            total_minutes: None,
        });
    };

    let mut week_total = candidate.duree_minutes();

    for other in util::services_of(all, conducteur_id, service_id) {
        if other.date == candidate.date {
            if util::overlaps(candidate, other) {
                debug!(service = %service_id, other = %other.id, conducteur = %conducteur_id, "overlap");
                return Err(Conflict::pair(
                    conducteur_id,
                    service_id,
                    &other.id,
                    ConflictKind::Overlap,
                ));
            }
            if util::rest_too_short(candidate, other, opts) {
                debug!(service = %service_id, other = %other.id, conducteur = %conducteur_id, "rest under minimum");
                return Err(Conflict::pair(
                    conducteur_id,
                    service_id,
                    &other.id,
                    ConflictKind::RestViolation,
                ));
            }
        }
        if util::same_week(candidate.date, other.date) {
            week_total += other.duree_minutes();
        }
    }

    if week_total > opts.weekly_cap_minutes {
        debug!(service = %service_id, conducteur = %conducteur_id, week_total, "weekly cap exceeded");
        return Err(Conflict {
            conducteur: conducteur_id.clone(),
            service: service_id.clone(),
            other: None,
            kind: ConflictKind::WeeklyCap,
            semaine: Some(temps::semaine_iso(candidate.date).0),
            total_minutes: Some(week_total),
        });
    }

    Ok(())
}

/// Affectable selon les règles par défaut (12h de repos, 44h par semaine).
pub fn can_assign(service_id: &ServiceId, conducteur_id: &ConducteurId, all: &[Service]) -> bool {
    check_assignment(service_id, conducteur_id, all, AssignOptions::default()).is_ok()
}

/// Relevé de tous les conflits des affectations existantes.
pub fn detect_conflicts(all: &[Service], opts: AssignOptions) -> Vec<Conflict> {
    let mut by_conducteur: BTreeMap<&ConducteurId, Vec<&Service>> = BTreeMap::new();
    for s in all {
        if let Some(c) = s.conducteur_id.as_ref() {
            by_conducteur.entry(c).or_default().push(s);
        }
    }

    let mut out = Vec::new();

    for (conducteur, mut services) in by_conducteur {
        services.sort_by_key(|s| (s.date, s.heure_debut));

        for (idx, a) in services.iter().enumerate() {
            for b in services.iter().skip(idx + 1).take_while(|b| b.date == a.date) {
                if util::overlaps(a, b) {
                    out.push(Conflict::pair(conducteur, &a.id, &b.id, ConflictKind::Overlap));
                }
                if util::rest_too_short(a, b, opts) {
                    out.push(Conflict::pair(
                        conducteur,
                        &a.id,
                        &b.id,
                        ConflictKind::RestViolation,
                    ));
                }
            }
        }

        let mut weeks: BTreeMap<NaiveDate, (i64, &Service)> = BTreeMap::new();
        for &s in &services {
            let lundi = temps::semaine_iso(s.date).0;
            let entry = weeks.entry(lundi).or_insert((0, s));
            entry.0 += s.duree_minutes();
            entry.1 = s;
        }
        for (lundi, (total, last)) in weeks {
            if total > opts.weekly_cap_minutes {
                out.push(Conflict {
                    conducteur: conducteur.clone(),
                    service: last.id.clone(),
                    other: None,
                    kind: ConflictKind::WeeklyCap,
                    semaine: Some(lundi),
                    total_minutes: Some(total),
                });
            }
        }
    }

    out
}
