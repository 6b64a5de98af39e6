use super::AssignOptions;
use crate::model::{ConducteurId, Service, ServiceId};
use crate::temps;
use chrono::NaiveDate;

/// Chevauchement de deux intervalles `[start, end)` en minutes.
pub(super) fn overlaps(a: &Service, b: &Service) -> bool {
    let (a_start, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    !(a_end <= b_start || a_start >= b_end)
}

/// Repos insuffisant entre deux services, dans un sens ou dans l'autre.
pub(super) fn rest_too_short(a: &Service, b: &Service, opts: AssignOptions) -> bool {
    let (a_start, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    let too_short = |gap: i64| gap >= 0 && gap < opts.min_rest_minutes;
    too_short(a_start - b_end) || too_short(b_start - a_end)
}

fn bounds(s: &Service) -> (i64, i64) {
    (
        i64::from(s.heure_debut.minutes()),
        i64::from(s.heure_fin.minutes()),
    )
}

pub(super) fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    temps::semaine_iso(a) == temps::semaine_iso(b)
}

/// Services déjà affectés au conducteur, hors `exclude`.
pub(super) fn services_of<'a>(
    all: &'a [Service],
    conducteur: &'a ConducteurId,
    exclude: &'a ServiceId,
) -> impl Iterator<Item = &'a Service> + 'a {
    all.iter()
        .filter(move |s| s.conducteur_id.as_ref() == Some(conducteur) && &s.id != exclude)
}

pub(super) fn find_service<'a>(all: &'a [Service], id: &ServiceId) -> Option<&'a Service> {
    all.iter().find(|s| &s.id == id)
}
