mod conflicts;
mod mutate;
mod types;
mod util;

pub use conflicts::{can_assign, check_assignment, detect_conflicts};
pub use types::{AssignOptions, Conflict, ConflictKind, SchedError};

use crate::horloge::EtatHorloge;
use crate::model::{ConducteurId, NumeroParc, Reseau, Service, ServiceId};
use crate::pointage::{NonAssurance, Pointage, PointageDemande};
use chrono::NaiveDateTime;

/// Planning : encapsule l'instantané du réseau et ses mutations locales.
///
/// Chaque mutation est validée ici avant d'être répercutée sur l'API ; rien n'est
/// verrouillé et le serveur reste l'autorité.
#[derive(Debug, Default)]
pub struct Planning {
    reseau: Reseau,
    opts: AssignOptions,
    horloge: EtatHorloge,
}

impl Planning {
    pub fn new(reseau: Reseau) -> Self {
        Self::with_options(reseau, AssignOptions::default())
    }

    pub fn with_options(reseau: Reseau, opts: AssignOptions) -> Self {
        Self {
            reseau,
            opts,
            horloge: EtatHorloge::Synchronise,
        }
    }

    pub fn reseau(&self) -> &Reseau {
        &self.reseau
    }
    pub fn reseau_mut(&mut self) -> &mut Reseau {
        &mut self.reseau
    }
    pub fn into_reseau(self) -> Reseau {
        self.reseau
    }

    pub fn options(&self) -> AssignOptions {
        self.opts
    }

    pub fn horloge(&self) -> EtatHorloge {
        self.horloge
    }

    /// Une dérive d'horloge passe le planning en mode dégradé (mutations refusées).
    pub fn set_horloge(&mut self, etat: EtatHorloge) {
        self.horloge = etat;
    }

    pub fn services(&self) -> Vec<Service> {
        self.reseau.services()
    }

    pub fn check_assignment(
        &self,
        service: &ServiceId,
        conducteur: &ConducteurId,
    ) -> Result<(), Conflict> {
        conflicts::check_assignment(service, conducteur, &self.services(), self.opts)
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(&self.services(), self.opts)
    }

    pub fn assigner_conducteur(
        &mut self,
        service: &ServiceId,
        conducteur: &ConducteurId,
    ) -> Result<(), SchedError> {
        mutate::assigner_conducteur(self, service, conducteur)
    }

    pub fn desassigner_conducteur(&mut self, service: &ServiceId) -> Result<(), SchedError> {
        mutate::desassigner_conducteur(self, service)
    }

    pub fn assigner_vehicule(
        &mut self,
        service: &ServiceId,
        parc: &NumeroParc,
    ) -> Result<(), SchedError> {
        mutate::assigner_vehicule(self, service, parc)
    }

    pub fn marquer_non_assure(
        &mut self,
        service: &ServiceId,
        motif: NonAssurance,
    ) -> Result<(), SchedError> {
        mutate::marquer_non_assure(self, service, motif)
    }

    pub fn pointer(
        &mut self,
        service: &ServiceId,
        demande: PointageDemande,
        validated_by: &str,
        now: NaiveDateTime,
    ) -> Result<Pointage, SchedError> {
        mutate::pointer(self, service, demande, validated_by, now)
    }

    pub fn supprimer_service(&mut self, service: &ServiceId) -> Result<Service, SchedError> {
        mutate::supprimer_service(self, service)
    }
}
