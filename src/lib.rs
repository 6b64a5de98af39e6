#![forbid(unsafe_code)]
//! Plannings : règles de planification d'un réseau de bus, côté client.
//!
//! - Affectation des conducteurs : chevauchement, repos de 12h, plafond de 44h par semaine.
//! - Statut des services à l'écran de pointage (TC360).
//! - Filtrage des services par date, jour de fonctionnement, contraintes et calendrier.
//! - Client REST et rafraîchissements périodiques (feature `remote`).
//! - Heures locales `HH:MM` ; les services de nuit ne sont pas modélisés.

#[cfg(feature = "remote")]
pub mod api;
pub mod config;
pub mod filtre;
pub mod horloge;
pub mod io;
pub mod model;
pub mod pointage;
#[cfg(feature = "remote")]
pub mod polling;
pub mod scheduler;
pub mod session;
pub mod statut;
pub mod storage;
pub mod temps;

pub use config::{Config, ConfigError};
pub use filtre::{grouper_par_ligne, services_semaine, services_visibles, Filtre, GroupeLigne};
pub use horloge::{verifier_derive, EtatHorloge};
pub use model::{
    Conducteur, ConducteurId, Heure, Ligne, LigneId, NumeroParc, Reseau, Sens, SensId, Service,
    ServiceId, ServiceVue, StatutConducteur, StatutService, Vehicule,
};
pub use pointage::{NonAssurance, Pointage, PointageDemande};
pub use scheduler::{
    can_assign, check_assignment, detect_conflicts, AssignOptions, Conflict, ConflictKind,
    Planning, SchedError,
};
pub use session::{Session, SessionStore, Utilisateur};
pub use statut::{classify, Retard, StatutAffiche, StatutKind};
pub use storage::{JsonStorage, Storage};
pub use temps::{JourFonctionnement, ParseError};
