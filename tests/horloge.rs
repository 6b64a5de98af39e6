#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use plannings::horloge::{duree_jusqu_a_minuit, verifier_derive, EtatHorloge};

#[test]
fn drift_within_threshold_is_synchronised() {
    let local = Utc.with_ymd_and_hms(2025, 3, 12, 8, 0, 0).unwrap();
    let seuil = Duration::minutes(5);
    assert_eq!(verifier_derive(local, local, seuil), EtatHorloge::Synchronise);
    assert_eq!(
        verifier_derive(local + Duration::minutes(5), local, seuil),
        EtatHorloge::Synchronise
    );
    assert_eq!(
        verifier_derive(local - Duration::minutes(5), local, seuil),
        EtatHorloge::Synchronise
    );
}

#[test]
fn drift_beyond_threshold_degrades() {
    let local = Utc.with_ymd_and_hms(2025, 3, 12, 8, 0, 0).unwrap();
    let seuil = Duration::minutes(5);
    let etat = verifier_derive(local + Duration::seconds(301), local, seuil);
    assert_eq!(etat, EtatHorloge::Degrade { ecart_secondes: 301 });
    assert!(etat.is_degrade());
    assert_eq!(
        verifier_derive(local - Duration::minutes(7), local, seuil),
        EtatHorloge::Degrade {
            ecart_secondes: -420
        }
    );
}

#[test]
fn time_until_midnight() {
    let d = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
    assert_eq!(
        duree_jusqu_a_minuit(d.and_hms_opt(23, 30, 0).unwrap()),
        Duration::minutes(30)
    );
    assert_eq!(
        duree_jusqu_a_minuit(d.and_hms_opt(0, 0, 0).unwrap()),
        Duration::hours(24)
    );
}

#[test]
fn state_serializes_with_tag() {
    assert_eq!(
        serde_json::to_value(EtatHorloge::Degrade { ecart_secondes: 400 }).unwrap(),
        serde_json::json!({ "etat": "degrade", "ecart_secondes": 400 })
    );
}
