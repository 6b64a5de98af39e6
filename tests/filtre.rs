#![forbid(unsafe_code)]
use chrono::NaiveDate;
use plannings::filtre::{
    grouper_par_ligne, render_groupes, services_semaine, services_visibles, Filtre,
};
use plannings::model::{ConducteurId, Reseau};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Réseau de test : 2025-03-12 est un mercredi, 2025-03-15 un samedi.
fn reseau() -> Reseau {
    serde_json::from_value(serde_json::json!({
        "lignes": [
            {
                "id": 1, "numero": "42", "nom": "Gare - Hôpital",
                "contraintes": ["scolaire"],
                "sens": [
                    { "id": 10, "nom": "Aller", "jourFonctionnement": "SEMAINE", "services": [
                        { "id": "s42-b", "date": "2025-03-12", "heureDebut": "10:00", "heureFin": "11:00" },
                        { "id": "s42-a", "date": "2025-03-12", "heureDebut": "08:00", "heureFin": "09:00", "conducteurId": "c1" },
                        { "id": "s42-sam", "date": "2025-03-15", "heureDebut": "08:00", "heureFin": "09:00" }
                    ]}
                ]
            },
            {
                "id": 2, "numero": "7", "nom": "Centre",
                "contraintes": ["pmr"],
                "calendrierJson": "{\"mercredi\": false, \"jeudi\": true}",
                "sens": [
                    { "id": 20, "services": [
                        { "id": "s7-mer", "date": "2025-03-12", "heureDebut": "07:00", "heureFin": "08:00" },
                        { "id": "s7-jeu", "date": "2025-03-13", "heureDebut": "07:00", "heureFin": "08:00", "conducteurId": "c1" }
                    ]}
                ]
            },
            {
                "id": 3, "numero": "N1", "nom": "Noctambus",
                "sens": [
                    { "id": 30, "jourFonctionnement": "SAMEDI", "services": [
                        { "id": "sn-sam", "date": "2025-03-15", "heureDebut": "21:00", "heureFin": "23:00" }
                    ]}
                ]
            },
            {
                "id": 4, "numero": "12", "nom": "Zone industrielle",
                "sens": [
                    { "id": 40, "services": [
                        { "id": "s12-mer", "date": "2025-03-12", "heureDebut": "05:30", "heureFin": "06:30" },
                        { "id": "s12-lun", "date": "2025-03-10T00:00:00.000Z", "heureDebut": "05:30", "heureFin": "06:30" }
                    ]}
                ]
            }
        ]
    }))
    .unwrap()
}

fn ids(reseau: &Reseau, filtre: &Filtre) -> Vec<String> {
    services_visibles(reseau, filtre)
        .iter()
        .map(|v| v.service.id.to_string())
        .collect()
}

#[test]
fn weekday_line_visible_on_wednesday_not_saturday() {
    let reseau = reseau();
    let mercredi = grouper_par_ligne(services_visibles(&reseau, &Filtre::jour(d(2025, 3, 12))));
    let l42 = mercredi.iter().find(|g| g.numero == "42").unwrap();
    assert!(l42.services.iter().any(|v| v.service.id.as_str() == "s42-a"));

    let samedi = grouper_par_ligne(services_visibles(&reseau, &Filtre::jour(d(2025, 3, 15))));
    assert!(samedi.iter().all(|g| g.numero != "42"));
    assert_eq!(samedi.len(), 1);
    assert_eq!(samedi[0].numero, "N1");
}

#[test]
fn date_must_match_exactly() {
    let reseau = reseau();
    let mardi = Filtre::jour(d(2025, 3, 11));
    assert!(ids(&reseau, &mardi).is_empty());
    let lundi = Filtre::jour(d(2025, 3, 10)).with_contraintes(["scolaire", "pmr"]);
    assert!(!ids(&reseau, &lundi).contains(&"s12-lun".to_string()));
    assert_eq!(ids(&reseau, &Filtre::jour(d(2025, 3, 10))), vec!["s12-lun"]);
}

#[test]
fn constraints_use_or_semantics() {
    let reseau = reseau();
    let jeudi = d(2025, 3, 13);
    assert_eq!(
        ids(&reseau, &Filtre::jour(jeudi).with_contraintes(["pmr", "scolaire"])),
        vec!["s7-jeu"]
    );
    assert!(ids(&reseau, &Filtre::jour(jeudi).with_contraintes(["scolaire"])).is_empty());

    let mercredi = Filtre::jour(d(2025, 3, 12)).with_contraintes(["scolaire"]);
    let mut got = ids(&reseau, &mercredi);
    got.sort();
    assert_eq!(got, vec!["s42-a", "s42-b"]);
}

#[test]
fn line_calendar_closes_days() {
    let reseau = reseau();
    let mercredi = ids(&reseau, &Filtre::jour(d(2025, 3, 12)));
    assert!(!mercredi.contains(&"s7-mer".to_string()));
    assert!(mercredi.contains(&"s12-mer".to_string()));
}

#[test]
fn groups_sorted_by_line_then_start_time() {
    let reseau = reseau();
    let groupes = grouper_par_ligne(services_visibles(&reseau, &Filtre::jour(d(2025, 3, 12))));
    let numeros: Vec<&str> = groupes.iter().map(|g| g.numero.as_str()).collect();
    assert_eq!(numeros, vec!["12", "42"]);
    let l42: Vec<&str> = groupes[1]
        .services
        .iter()
        .map(|v| v.service.id.as_str())
        .collect();
    assert_eq!(l42, vec!["s42-a", "s42-b"]);
}

#[test]
fn week_view_for_one_driver() {
    let reseau = reseau();
    let c1 = ConducteurId::new("c1");
    let semaine: Vec<&str> = services_semaine(&reseau, d(2025, 3, 14), Some(&c1))
        .iter()
        .map(|v| v.service.id.as_str())
        .collect();
    assert_eq!(semaine, vec!["s42-a", "s7-jeu"]);
    assert_eq!(services_semaine(&reseau, d(2025, 3, 14), None).len(), 8);
}

#[test]
fn rendered_day() {
    let reseau = reseau();
    let groupes = grouper_par_ligne(services_visibles(&reseau, &Filtre::jour(d(2025, 3, 12))));
    let now = d(2025, 3, 12).and_hms_opt(7, 50, 0).unwrap();
    insta::assert_snapshot!(render_groupes(&groupes, now), @r"
    Ligne 12 (Zone industrielle)
      05:30-06:30 s12-mer [Expiré] conducteur=- vehicule=-
    Ligne 42 (Gare - Hôpital)
      08:00-09:00 s42-a [À pointer] conducteur=c1 vehicule=-
      10:00-11:00 s42-b [À venir] conducteur=- vehicule=-
    ");
}
