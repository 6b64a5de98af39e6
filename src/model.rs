use crate::temps::{self, JourFonctionnement, ParseError};
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifiant tel que renvoyé par l'API : nombre ou chaîne.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IdBrut {
    Texte(String),
    Nombre(i64),
}

impl From<IdBrut> for String {
    fn from(raw: IdBrut) -> Self {
        match raw {
            IdBrut::Texte(s) => s,
            IdBrut::Nombre(n) => n.to_string(),
        }
    }
}

macro_rules! identifiant {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "IdBrut")]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<IdBrut> for $name {
            fn from(raw: IdBrut) -> Self {
                Self(raw.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifiant!(
    /// Identifiant fort pour Service
    ServiceId
);
identifiant!(
    /// Identifiant fort pour Conducteur
    ConducteurId
);
identifiant!(LigneId);
identifiant!(SensId);
identifiant!(
    /// Numéro de parc d'un véhicule
    NumeroParc
);

/// Heure locale `HH:MM`, stockée en minutes depuis minuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Heure(u32);

impl Heure {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        temps::to_minutes(s).map(Self)
    }
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl TryFrom<String> for Heure {
    type Error = ParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Heure> for String {
    fn from(h: Heure) -> Self {
        temps::format_minutes(h.0)
    }
}

impl fmt::Display for Heure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&temps::format_minutes(self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatutService {
    #[default]
    #[serde(rename = "Planifiée")]
    Planifiee,
    #[serde(rename = "Non assuré")]
    NonAssure,
    #[serde(rename = "Terminée")]
    Terminee,
}

/// Service de conduite (un départ d'un sens de ligne).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub heure_debut: Heure,
    pub heure_fin: Heure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ligne_id: Option<LigneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sens_id: Option<SensId>,
    #[serde(default)]
    pub conducteur_id: Option<ConducteurId>,
    #[serde(default)]
    pub vehicule_assigne: Option<NumeroParc>,
    #[serde(default)]
    pub statut: StatutService,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motif_non_assurance: Option<String>,
}

impl Service {
    pub fn new(id: ServiceId, date: NaiveDate, heure_debut: Heure, heure_fin: Heure) -> Self {
        Self {
            id,
            date,
            heure_debut,
            heure_fin,
            ligne_id: None,
            sens_id: None,
            conducteur_id: None,
            vehicule_assigne: None,
            statut: StatutService::Planifiee,
            motif_non_assurance: None,
        }
    }

    /// Durée en minutes (négative si `heure_fin < heure_debut`).
    pub fn duree_minutes(&self) -> i64 {
        i64::from(self.heure_fin.minutes()) - i64::from(self.heure_debut.minutes())
    }
}

/// Calendrier d'ouverture d'une ligne, indexé par jour français (`lundi`…).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Calendrier(BTreeMap<String, bool>);

impl Calendrier {
    pub fn new(jours: BTreeMap<String, bool>) -> Self {
        Self(jours)
    }

    /// Un jour absent du calendrier est considéré ouvert.
    pub fn est_ouvert(&self, date: NaiveDate) -> bool {
        self.0
            .get(temps::jour_francais(date))
            .copied()
            .unwrap_or(true)
    }
}

/// Sens (direction) d'une ligne.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sens {
    pub id: SensId,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub jour_fonctionnement: Option<JourFonctionnement>,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ligne {
    pub id: LigneId,
    #[serde(deserialize_with = "de_texte")]
    pub numero: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub contraintes: Vec<String>,
    #[serde(
        default,
        deserialize_with = "de_calendrier",
        skip_serializing_if = "Option::is_none"
    )]
    pub calendrier_json: Option<Calendrier>,
    #[serde(default)]
    pub sens: Vec<Sens>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatutConducteur {
    #[default]
    Actif,
    #[serde(rename = "En congé")]
    EnConge,
    Inactif,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conducteur {
    pub id: ConducteurId,
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub matricule: String,
    #[serde(default)]
    pub statut: StatutConducteur,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicule {
    pub parc: NumeroParc,
    #[serde(default, alias = "type")]
    pub type_vehicule: Option<String>,
    #[serde(default)]
    pub modele: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
}

/// Service vu avec sa ligne et son sens parents.
#[derive(Debug, Clone, Copy)]
pub struct ServiceVue<'a> {
    pub service: &'a Service,
    pub ligne: &'a Ligne,
    pub sens: &'a Sens,
}

/// Copie locale (transitoire) de l'état du réseau côté client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reseau {
    #[serde(default)]
    pub lignes: Vec<Ligne>,
    #[serde(default)]
    pub conducteurs: Vec<Conducteur>,
    #[serde(default)]
    pub vehicules: Vec<Vehicule>,
}

impl Reseau {
    /// Aplatit Ligne → Sens → Service en vues empruntées.
    pub fn vues(&self) -> Vec<ServiceVue<'_>> {
        self.lignes
            .iter()
            .flat_map(|ligne| {
                ligne.sens.iter().flat_map(move |sens| {
                    sens.services
                        .iter()
                        .map(move |service| ServiceVue { service, ligne, sens })
                })
            })
            .collect()
    }

    /// Liste plate des services, `ligne_id`/`sens_id` renseignés depuis les parents.
    pub fn services(&self) -> Vec<Service> {
        self.vues()
            .into_iter()
            .map(|v| {
                let mut s = v.service.clone();
                s.ligne_id = Some(v.ligne.id.clone());
                s.sens_id = Some(v.sens.id.clone());
                s
            })
            .collect()
    }

    pub fn find_service<'a>(&'a self, id: &ServiceId) -> Option<&'a Service> {
        self.lignes
            .iter()
            .flat_map(|l| l.sens.iter())
            .flat_map(|s| s.services.iter())
            .find(|s| &s.id == id)
    }

    pub fn find_service_mut(&mut self, id: &ServiceId) -> Option<&mut Service> {
        self.lignes
            .iter_mut()
            .flat_map(|l| l.sens.iter_mut())
            .flat_map(|s| s.services.iter_mut())
            .find(|s| &s.id == id)
    }

    pub fn find_conducteur<'a>(&'a self, id: &ConducteurId) -> Option<&'a Conducteur> {
        self.conducteurs.iter().find(|c| &c.id == id)
    }

    pub fn find_vehicule<'a>(&'a self, parc: &NumeroParc) -> Option<&'a Vehicule> {
        self.vehicules.iter().find(|v| &v.parc == parc)
    }

    pub fn remove_service(&mut self, id: &ServiceId) -> Option<Service> {
        for sens in self.lignes.iter_mut().flat_map(|l| l.sens.iter_mut()) {
            if let Some(pos) = sens.services.iter().position(|s| &s.id == id) {
                return Some(sens.services.remove(pos));
            }
        }
        None
    }
}

/// Accepte `YYYY-MM-DD` ou un datetime ISO ; seuls les 10 premiers caractères comptent.
pub(crate) fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(de::Error::custom)
}

fn de_texte<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdBrut::deserialize(deserializer).map(String::from)
}

/// `calendrierJson` arrive soit en objet, soit en chaîne contenant un objet JSON.
fn de_calendrier<'de, D>(deserializer: D) -> Result<Option<Calendrier>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Brut {
        Objet(BTreeMap<String, bool>),
        Texte(String),
    }

    match Option::<Brut>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Brut::Objet(jours)) => Ok(Some(Calendrier(jours))),
        Some(Brut::Texte(s)) if s.trim().is_empty() => Ok(None),
        Some(Brut::Texte(s)) => serde_json::from_str::<BTreeMap<String, bool>>(&s)
            .map(|jours| Some(Calendrier(jours)))
            .map_err(de::Error::custom),
    }
}
