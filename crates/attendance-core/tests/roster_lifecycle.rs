use attendance_core::policy::{CorrectiveAction, PolicyEngine};
use attendance_core::roster::domain::{EmployeeId, IncidentId, IncidentKind};
use attendance_core::roster::{IncidentUpdate, NewEmployee, NewIncident, Roster, RosterError};
use chrono::{Duration, NaiveDate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid evaluation date")
}

fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

fn hire(roster: &mut Roster, name: &str, center: &str) -> EmployeeId {
    roster
        .add_employee(
            NewEmployee {
                name: name.to_string(),
                position: "Behavior Technician".to_string(),
                center: center.to_string(),
                hire_date: Some(days_ago(500)),
            },
            today(),
        )
        .expect("employee added")
}

fn record(
    roster: &mut Roster,
    employee_id: &EmployeeId,
    kind: IncidentKind,
    date: NaiveDate,
) -> IncidentId {
    roster
        .add_incident(NewIncident {
            employee_id: employee_id.clone(),
            date,
            kind,
            points: None,
            notes: String::new(),
        })
        .expect("incident recorded")
}

#[test]
fn ids_are_sequential_per_prefix() {
    let mut roster = Roster::default();
    let first = hire(&mut roster, "Avery Cole", "Beachwood");
    let second = hire(&mut roster, "Blake Ortiz", "Solon");
    assert_eq!(first.0, "emp-000001");
    assert_eq!(second.0, "emp-000002");

    let incident = record(&mut roster, &second, IncidentKind::LateArrival, days_ago(1));
    assert_eq!(incident.0, "inc-000001");

    roster.remove_employee(&first).expect("employee removed");
    let third = hire(&mut roster, "Casey Park", "Solon");
    assert_eq!(third.0, "emp-000003", "numbering continues above the highest id");
}

#[test]
fn deleting_employee_cascades_to_their_incidents() {
    let mut roster = Roster::default();
    let leaving = hire(&mut roster, "Avery Cole", "Beachwood");
    let staying = hire(&mut roster, "Blake Ortiz", "Solon");

    record(&mut roster, &leaving, IncidentKind::LateArrival, days_ago(3));
    record(&mut roster, &leaving, IncidentKind::UnexpectedIllness, days_ago(2));
    record(&mut roster, &staying, IncidentKind::EarlyDeparture, days_ago(1));

    let removed = roster.remove_employee(&leaving).expect("employee removed");
    assert_eq!(removed.incidents_removed, 2);
    assert_eq!(roster.employees.len(), 1);
    assert!(roster
        .incidents
        .iter()
        .all(|incident| incident.employee_id == staying));

    assert!(matches!(
        roster.remove_employee(&leaving),
        Err(RosterError::EmployeeNotFound(_))
    ));
}

#[test]
fn negative_adjustment_clamps_total_to_zero() {
    let engine = PolicyEngine::default();
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");
    record(&mut roster, &id, IncidentKind::LateArrival, days_ago(10));
    record(&mut roster, &id, IncidentKind::EarlyDeparture, days_ago(5));

    let adjustment = roster
        .adjust_points(&id, -10, today(), "Perfect attendance bonus".to_string())
        .expect("adjustment recorded");

    let stored = roster.incident(&adjustment).expect("adjustment stored");
    assert_eq!(stored.points(), -4);
    assert_eq!(engine.total_points(&roster.incidents, &id), 0);

    let later = record(&mut roster, &id, IncidentKind::LateArrival, today());
    assert_eq!(engine.total_points(&roster.incidents, &id), 2);
    roster.remove_incident(&later).expect("incident removed");

    roster
        .update_incident(
            &adjustment,
            IncidentUpdate {
                points: Some(-1),
                ..IncidentUpdate::default()
            },
        )
        .expect("adjustment edited");
    assert_eq!(engine.total_points(&roster.incidents, &id), 3);
}

#[test]
fn removing_offset_points_does_not_leave_a_negative_balance() {
    let engine = PolicyEngine::default();
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");
    let absence = record(&mut roster, &id, IncidentKind::UnnotifiedAbsence, days_ago(30));

    let adjustment = roster
        .adjust_points(&id, -10, days_ago(20), "Documented emergency".to_string())
        .expect("adjustment recorded");
    assert_eq!(engine.total_points(&roster.incidents, &id), 0);

    roster.remove_incident(&absence).expect("incident removed");
    let stored = roster.incident(&adjustment).expect("adjustment kept");
    assert_eq!(stored.points(), 0);

    record(&mut roster, &id, IncidentKind::PlannedAbsence, days_ago(5));
    record(&mut roster, &id, IncidentKind::LateArrival, days_ago(2));

    let recommendation = engine.recommend(&roster, &id, today());
    assert_eq!(recommendation.points, 6);
    assert_eq!(recommendation.no_call_no_shows, 0);
    assert_eq!(recommendation.action, CorrectiveAction::VerbalWarning);
}

#[test]
fn fixed_point_kinds_reject_overrides() {
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");

    let result = roster.add_incident(NewIncident {
        employee_id: id.clone(),
        date: today(),
        kind: IncidentKind::LateArrival,
        points: Some(5),
        notes: String::new(),
    });
    assert!(matches!(
        result,
        Err(RosterError::FixedPoints {
            expected: 2,
            supplied: 5,
            ..
        })
    ));

    let other = roster.add_incident(NewIncident {
        employee_id: id,
        date: today(),
        kind: IncidentKind::Other,
        points: None,
        notes: "Uniform violation".to_string(),
    });
    assert!(matches!(other, Err(RosterError::MissingPoints { .. })));
    assert!(roster.incidents.is_empty());
}

#[test]
fn acknowledged_alert_rearms_when_points_change() {
    let engine = PolicyEngine::default();
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");
    record(&mut roster, &id, IncidentKind::UnexpectedIllness, days_ago(30));
    record(&mut roster, &id, IncidentKind::UnexpectedIllness, days_ago(10));

    let alerts = engine.alerts(&roster, today());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].action, CorrectiveAction::WrittenWarning);
    assert!(!alerts[0].previously_notified);

    roster
        .record_notification(
            &id,
            alerts[0].action,
            today(),
            alerts[0].points,
            "Signed copy on file".to_string(),
        )
        .expect("notification recorded");
    assert!(engine.alerts(&roster, today()).is_empty());

    record(&mut roster, &id, IncidentKind::LateArrival, today());
    let alerts = engine.alerts(&roster, today());
    assert_eq!(alerts.len(), 1, "new points re-raise the alert");
    assert_eq!(alerts[0].points, 10);
    assert!(alerts[0].previously_notified);
    assert_eq!(alerts[0].last_notified, Some(today()));
}

#[test]
fn single_no_call_no_show_escalates_verbal_warning() {
    let engine = PolicyEngine::default();
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");
    record(&mut roster, &id, IncidentKind::UnnotifiedAbsence, days_ago(60));
    roster
        .adjust_points(&id, -4, days_ago(1), "Manager review".to_string())
        .expect("adjustment recorded");

    let recommendation = engine.recommend(&roster, &id, today());
    assert_eq!(recommendation.points, 6);
    assert_eq!(recommendation.no_call_no_shows, 1);
    assert_eq!(
        recommendation.action,
        CorrectiveAction::WrittenWarningNoCallNoShow
    );
}

#[test]
fn clear_all_alerts_records_history_for_each_employee() {
    let engine = PolicyEngine::default();
    let mut roster = Roster::default();
    let first = hire(&mut roster, "Avery Cole", "Beachwood");
    let second = hire(&mut roster, "Blake Ortiz", "Solon");
    let quiet = hire(&mut roster, "Casey Park", "Solon");
    record(&mut roster, &first, IncidentKind::PlannedAbsence, days_ago(4));
    record(&mut roster, &second, IncidentKind::UnnotifiedAbsence, days_ago(4));

    let cleared = roster.clear_all_alerts(&engine, today());
    assert_eq!(cleared, vec![first.clone(), second.clone()]);
    assert!(engine.alerts(&roster, today()).is_empty());

    let notices = &roster.employee(&second).expect("employee present").notifications;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].action, "Written Warning");
    assert_eq!(notices[0].points_at_time, 10);
    assert!(roster
        .employee(&quiet)
        .expect("employee present")
        .notifications
        .is_empty());

    roster.restore_alert(&first).expect("alert restored");
    let alerts = engine.alerts(&roster, today());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].employee_id, first);
}

#[test]
fn orphaned_incidents_render_as_unknown() {
    let mut roster = Roster::default();
    let id = hire(&mut roster, "Avery Cole", "Beachwood");
    record(&mut roster, &id, IncidentKind::LateArrival, days_ago(1));
    roster.employees.clear();

    assert_eq!(roster.employee_name(&id), "Unknown");
}
