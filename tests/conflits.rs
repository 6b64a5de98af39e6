#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use plannings::model::{ConducteurId, Heure, Service, ServiceId};
use plannings::scheduler::{
    can_assign, check_assignment, detect_conflicts, AssignOptions, ConflictKind,
};

fn lundi() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn service(id: &str, date: NaiveDate, debut: &str, fin: &str, conducteur: Option<&str>) -> Service {
    let mut s = Service::new(
        ServiceId::new(id),
        date,
        Heure::parse(debut).unwrap(),
        Heure::parse(fin).unwrap(),
    );
    s.conducteur_id = conducteur.map(ConducteurId::new);
    s
}

fn c1() -> ConducteurId {
    ConducteurId::new("c1")
}

#[test]
fn overlapping_services_same_day_refused() {
    let all = vec![
        service("a", lundi(), "09:00", "11:00", Some("c1")),
        service("b", lundi(), "10:00", "12:00", None),
    ];
    assert!(!can_assign(&ServiceId::new("b"), &c1(), &all));
    let conflict = check_assignment(&ServiceId::new("b"), &c1(), &all, AssignOptions::default())
        .unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::Overlap);
    assert_eq!(conflict.other, Some(ServiceId::new("a")));
}

#[test]
fn touching_services_violate_rest() {
    let all = vec![
        service("a", lundi(), "09:00", "11:00", Some("c1")),
        service("b", lundi(), "11:00", "13:00", None),
    ];
    let conflict = check_assignment(&ServiceId::new("b"), &c1(), &all, AssignOptions::default())
        .unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::RestViolation);
}

#[test]
fn rest_checked_in_both_directions() {
    // le candidat finit 2h avant le début d'un service déjà pris
    let all = vec![
        service("a", lundi(), "14:00", "16:00", Some("c1")),
        service("b", lundi(), "06:00", "12:00", None),
    ];
    assert!(!can_assign(&ServiceId::new("b"), &c1(), &all));
}

#[test]
fn twelve_and_a_half_hours_gap_is_fine() {
    let all = vec![
        service("a", lundi(), "06:00", "08:00", Some("c1")),
        service("b", lundi(), "20:30", "22:00", None),
    ];
    assert!(can_assign(&ServiceId::new("b"), &c1(), &all));
}

#[test]
fn exactly_twelve_hours_gap_is_fine() {
    let all = vec![
        service("a", lundi(), "06:00", "08:00", Some("c1")),
        service("b", lundi(), "20:00", "21:00", None),
    ];
    assert!(can_assign(&ServiceId::new("b"), &c1(), &all));
}

#[test]
fn other_days_are_not_compared() {
    // 23:30 puis 00:15 le lendemain : non confrontés
    let all = vec![
        service("a", lundi(), "22:00", "23:30", Some("c1")),
        service("b", lundi() + Duration::days(1), "00:15", "02:00", None),
    ];
    assert!(can_assign(&ServiceId::new("b"), &c1(), &all));
}

#[test]
fn other_drivers_and_self_are_ignored() {
    let all = vec![
        service("a", lundi(), "09:00", "11:00", Some("c2")),
        service("b", lundi(), "10:00", "12:00", Some("c1")),
    ];
    // b est déjà à c1 : il n'est pas comparé à lui-même
    assert!(can_assign(&ServiceId::new("b"), &c1(), &all));
}

#[test]
fn unknown_service_is_not_assignable() {
    let all = vec![service("a", lundi(), "09:00", "11:00", None)];
    let conflict = check_assignment(&ServiceId::new("zz"), &c1(), &all, AssignOptions::default())
        .unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::UnknownService);
}

fn week_of_seven_hours(days: i64) -> Vec<Service> {
    (0..days)
        .map(|i| {
            service(
                &format!("j{i}"),
                lundi() + Duration::days(i),
                "06:00",
                "13:00",
                Some("c1"),
            )
        })
        .collect()
}

#[test]
fn weekly_cap_reached_exactly_is_allowed() {
    let mut all = week_of_seven_hours(6);
    all.push(service("x", lundi() + Duration::days(6), "06:00", "08:00", None));
    assert!(can_assign(&ServiceId::new("x"), &c1(), &all));
}

#[test]
fn one_minute_over_the_cap_is_refused() {
    let mut all = week_of_seven_hours(6);
    all.push(service("x", lundi() + Duration::days(6), "06:00", "08:01", None));
    let conflict = check_assignment(&ServiceId::new("x"), &c1(), &all, AssignOptions::default())
        .unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::WeeklyCap);
    assert_eq!(conflict.total_minutes, Some(44 * 60 + 1));
    assert_eq!(conflict.semaine, Some(lundi()));
}

#[test]
fn seven_days_of_seven_hours_blocks_more() {
    let mut all = week_of_seven_hours(7);
    all.push(service("x", lundi() + Duration::days(3), "20:00", "21:00", None));
    assert!(!can_assign(&ServiceId::new("x"), &c1(), &all));

    // sans règle de repos, c'est bien le plafond qui refuse
    let sans_repos = AssignOptions {
        min_rest_minutes: 0,
        ..AssignOptions::default()
    };
    let conflict = check_assignment(&ServiceId::new("x"), &c1(), &all, sans_repos).unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::WeeklyCap);
    assert_eq!(conflict.total_minutes, Some(50 * 60));
    assert_eq!(conflict.semaine, Some(lundi()));
}

#[test]
fn free_day_after_six_long_days_hits_the_cap() {
    let mut all = week_of_seven_hours(6);
    all.push(service("d", lundi() + Duration::days(6), "06:00", "08:00", Some("c1")));
    all.push(service("x", lundi() + Duration::days(6), "20:00", "21:00", None));
    let conflict = check_assignment(&ServiceId::new("x"), &c1(), &all, AssignOptions::default())
        .unwrap_err();
    assert_eq!(conflict.kind, ConflictKind::WeeklyCap);
    assert_eq!(conflict.total_minutes, Some(45 * 60));
}

#[test]
fn previous_week_does_not_count() {
    let mut all = week_of_seven_hours(7);
    let lundi_suivant = lundi() + Duration::days(7);
    all.push(service("x", lundi_suivant, "06:00", "13:00", None));
    assert!(can_assign(&ServiceId::new("x"), &c1(), &all));
}

#[test]
fn options_change_the_rules() {
    let all = vec![
        service("a", lundi(), "06:00", "08:00", Some("c1")),
        service("b", lundi(), "10:00", "12:00", None),
    ];
    let opts = AssignOptions {
        min_rest_minutes: 60,
        ..AssignOptions::default()
    };
    assert!(check_assignment(&ServiceId::new("b"), &c1(), &all, opts).is_ok());
    assert!(check_assignment(&ServiceId::new("b"), &c1(), &all, AssignOptions::default()).is_err());
}

#[test]
fn detect_reports_pairs_and_weeks() {
    let mut all = vec![
        service("a", lundi(), "09:00", "11:00", Some("c1")),
        service("b", lundi(), "10:00", "12:00", Some("c1")),
        service("c", lundi(), "13:00", "14:00", Some("c2")),
    ];
    all.extend(
        week_of_seven_hours(7)
            .into_iter()
            .map(|mut s| {
                s.conducteur_id = Some(ConducteurId::new("c3"));
                s
            }),
    );

    let conflicts = detect_conflicts(&all, AssignOptions::default());
    let kinds: Vec<(&str, ConflictKind)> = conflicts
        .iter()
        .map(|c| (c.conducteur.as_str(), c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("c1", ConflictKind::Overlap),
            ("c3", ConflictKind::WeeklyCap)
        ]
    );
    assert_eq!(conflicts[1].total_minutes, Some(49 * 60));
}
