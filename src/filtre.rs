//! Sélection des services visibles pour une date, des contraintes et les calendriers
//! de ligne, puis regroupement par ligne.

use crate::model::{ConducteurId, Reseau, ServiceVue};
use crate::statut;
use crate::temps;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtre {
    pub date: NaiveDate,
    /// Contraintes de ligne sélectionnées (OU logique) ; vide = pas de filtre.
    pub contraintes: BTreeSet<String>,
}

impl Filtre {
    pub fn jour(date: NaiveDate) -> Self {
        Self {
            date,
            contraintes: BTreeSet::new(),
        }
    }

    pub fn with_contraintes<I, S>(mut self, contraintes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contraintes.extend(contraintes.into_iter().map(Into::into));
        self
    }

    fn retient(&self, vue: &ServiceVue<'_>) -> bool {
        if vue.service.date != self.date {
            return false;
        }
        if let Some(jour) = vue.sens.jour_fonctionnement {
            if jour != temps::jour_fonctionnement(self.date) {
                return false;
            }
        }
        if !self.contraintes.is_empty()
            && !vue
                .ligne
                .contraintes
                .iter()
                .any(|c| self.contraintes.contains(c))
        {
            return false;
        }
        vue.ligne
            .calendrier_json
            .as_ref()
            .map_or(true, |cal| cal.est_ouvert(self.date))
    }
}

pub fn services_visibles<'a>(reseau: &'a Reseau, filtre: &Filtre) -> Vec<ServiceVue<'a>> {
    reseau
        .vues()
        .into_iter()
        .filter(|v| filtre.retient(v))
        .collect()
}

#[derive(Debug, Clone)]
pub struct GroupeLigne<'a> {
    pub numero: String,
    pub nom: String,
    pub services: Vec<ServiceVue<'a>>,
}

/// Regroupe par numéro de ligne (ordre numérique si possible), services triés par heure de début.
pub fn grouper_par_ligne<'a>(vues: Vec<ServiceVue<'a>>) -> Vec<GroupeLigne<'a>> {
    let mut groupes: BTreeMap<(bool, u64, String), GroupeLigne<'a>> = BTreeMap::new();
    for vue in vues {
        let numero = vue.ligne.numero.clone();
        let key = match numero.parse::<u64>() {
            Ok(n) => (false, n, numero.clone()),
            Err(_) => (true, 0, numero.clone()),
        };
        groupes
            .entry(key)
            .or_insert_with(|| GroupeLigne {
                numero,
                nom: vue.ligne.nom.clone(),
                services: Vec::new(),
            })
            .services
            .push(vue);
    }

    groupes
        .into_values()
        .map(|mut g| {
            g.services.sort_by_key(|v| v.service.heure_debut);
            g
        })
        .collect()
}

/// Vue semaine : services de la semaine ISO de `date`, éventuellement d'un seul conducteur.
pub fn services_semaine<'a>(
    reseau: &'a Reseau,
    date: NaiveDate,
    conducteur: Option<&ConducteurId>,
) -> Vec<ServiceVue<'a>> {
    let (lundi, dimanche) = temps::semaine_iso(date);
    let mut out: Vec<ServiceVue<'a>> = reseau
        .vues()
        .into_iter()
        .filter(|v| v.service.date >= lundi && v.service.date <= dimanche)
        .filter(|v| conducteur.map_or(true, |c| v.service.conducteur_id.as_ref() == Some(c)))
        .collect();
    out.sort_by_key(|v| (v.service.date, v.service.heure_debut));
    out
}

/// Rendu texte des groupes, avec le statut de chaque service à `now`.
pub fn render_groupes(groupes: &[GroupeLigne<'_>], now: NaiveDateTime) -> String {
    let mut out = String::new();
    for g in groupes {
        let _ = writeln!(out, "Ligne {} ({})", g.numero, g.nom);
        for v in &g.services {
            let s = v.service;
            let _ = writeln!(
                out,
                "  {}-{} {} [{}] conducteur={} vehicule={}",
                s.heure_debut,
                s.heure_fin,
                s.id,
                statut::classify(s, now).label,
                s.conducteur_id.as_ref().map_or("-", |c| c.as_str()),
                s.vehicule_assigne.as_ref().map_or("-", |p| p.as_str()),
            );
        }
    }
    out
}
