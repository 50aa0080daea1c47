use boardflow_core::db::open_db_in_memory;
use boardflow_core::external::in_memory::{InMemoryIdentityProvider, RecordingNotifier};
use boardflow_core::model::resolution::ResolutionStatus;
use boardflow_core::model::status::AppointmentStatus;
use boardflow_core::repo::resolution_repo::{ResolutionRepository, SqliteResolutionRepository};
use boardflow_core::workflow::sweep::ReconciliationSweep;
use boardflow_core::{
    Appointment, AppointmentRepository, SqliteAppointmentRepository, SweepCriteria,
};
use chrono::{Datelike, Utc};
use rusqlite::Connection;

const OFFICER_EMAIL: &str = "dana.whitfield@lakeshore.example";

fn stuck_appointment(conn: &Connection) -> Appointment {
    let mut appointment =
        Appointment::new("Dana Whitfield", vec!["CEO".to_string()], "2025-01-01");
    appointment.appointee_email = Some(OFFICER_EMAIL.to_string());
    SqliteAppointmentRepository::new(conn)
        .create_appointment(&appointment)
        .unwrap();
    appointment
}

fn table_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn resolution_numbers_are_strictly_increasing() {
    let conn = open_db_in_memory().unwrap();
    let resolutions = SqliteResolutionRepository::new(&conn);

    let mut numbers = Vec::new();
    for _ in 0..4 {
        let number = resolutions.next_resolution_number(2025).unwrap();
        let resolution = boardflow_core::model::resolution::BoardResolution::for_appointment(
            number.clone(),
            uuid::Uuid::new_v4(),
            "Dana Whitfield",
            &["CEO".to_string()],
            "2025-01-01",
        );
        resolutions.create_resolution(&resolution).unwrap();
        numbers.push(number);
    }

    assert_eq!(
        numbers,
        vec!["2025-0001", "2025-0002", "2025-0003", "2025-0004"]
    );
    for window in numbers.windows(2) {
        assert!(window[0] < window[1]);
    }
}

#[test]
fn sweep_repairs_missing_identity_record_and_resolution() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let notifier = RecordingNotifier::new();
    let appointment = stuck_appointment(&conn);

    let sweep = ReconciliationSweep::new(&conn, &identity, &notifier);
    let report = sweep.run(&SweepCriteria::default()).unwrap();

    assert_eq!(report.found, 1);
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 0);

    let result = &report.results[0];
    assert!(result.success);
    assert!(!result.partial_success);
    assert!(result.identity_created);
    assert!(result.identity_id.is_some());
    assert!(result.appointment_record_created);
    assert!(result.resolution_created);
    assert!(result.workflow_triggered);
    assert!(result.error.is_none());

    let linked = SqliteAppointmentRepository::new(&conn)
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(linked.resolution_id, result.resolution_id);
}

#[test]
fn second_sweep_creates_nothing_new() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let notifier = RecordingNotifier::new();
    stuck_appointment(&conn);

    let sweep = ReconciliationSweep::new(&conn, &identity, &notifier);
    sweep.run(&SweepCriteria::default()).unwrap();

    let accounts_after_first = identity.account_count();
    let records_after_first = table_count(&conn, "appointment_records");
    let resolutions_after_first = table_count(&conn, "board_resolutions");
    let statuses_after_first: Vec<AppointmentStatus> = SqliteAppointmentRepository::new(&conn)
        .list_appointments(&SweepCriteria::default())
        .unwrap()
        .iter()
        .map(|a| a.status)
        .collect();

    let report = sweep.run(&SweepCriteria::default()).unwrap();

    assert_eq!(identity.account_count(), accounts_after_first);
    assert_eq!(table_count(&conn, "appointment_records"), records_after_first);
    assert_eq!(
        table_count(&conn, "board_resolutions"),
        resolutions_after_first
    );

    let result = &report.results[0];
    assert!(result.success);
    assert!(!result.identity_created);
    assert!(!result.appointment_record_created);
    assert!(!result.resolution_created);

    let statuses_after_second: Vec<AppointmentStatus> = SqliteAppointmentRepository::new(&conn)
        .list_appointments(&SweepCriteria::default())
        .unwrap()
        .iter()
        .map(|a| a.status)
        .collect();
    assert_eq!(statuses_after_first, statuses_after_second);
}

#[test]
fn case_differing_identity_resolves_without_creation() {
    let conn = open_db_in_memory().unwrap();
    let identity =
        InMemoryIdentityProvider::new().with_account("Dana.Whitfield@Lakeshore.example", "Dana");
    let notifier = RecordingNotifier::new();
    stuck_appointment(&conn);

    let report = ReconciliationSweep::new(&conn, &identity, &notifier)
        .run(&SweepCriteria::default())
        .unwrap();

    let result = &report.results[0];
    assert!(result.success);
    assert!(result.identity_id.is_some());
    assert!(!result.identity_created);
    assert_eq!(identity.account_count(), 1);
}

#[test]
fn unresolvable_identity_conflict_degrades_gracefully() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    identity.set_create_conflicts(true);
    let notifier = RecordingNotifier::new();
    stuck_appointment(&conn);

    let report = ReconciliationSweep::new(&conn, &identity, &notifier)
        .run(&SweepCriteria::default())
        .unwrap();

    let result = &report.results[0];
    // The provider claims the account exists but no lookup can find it; the
    // sweep records no identity and still completes the other repairs.
    assert!(result.identity_id.is_none());
    assert!(!result.identity_created);
    assert!(result.appointment_record_id.is_none());
    assert!(result.resolution_created);
    assert!(result.success);
    assert_eq!(identity.account_count(), 0);
}

#[test]
fn adopted_resolution_moves_status_to_board_adopted() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let notifier = RecordingNotifier::new();
    let appointment = stuck_appointment(&conn);

    let sweep = ReconciliationSweep::new(&conn, &identity, &notifier);
    let report = sweep.run(&SweepCriteria::default()).unwrap();
    let resolution_id = report.results[0].resolution_id.unwrap();

    SqliteResolutionRepository::new(&conn)
        .set_resolution_status(resolution_id, ResolutionStatus::Adopted)
        .unwrap();

    let report = sweep.run(&SweepCriteria::default()).unwrap();
    let result = &report.results[0];
    assert_eq!(result.status_before, AppointmentStatus::Draft);
    assert_eq!(result.status_after, AppointmentStatus::BoardAdopted);

    let loaded = SqliteAppointmentRepository::new(&conn)
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::BoardAdopted);
}

#[test]
fn criteria_filter_limits_the_batch() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let notifier = RecordingNotifier::new();

    stuck_appointment(&conn);
    let mut other = Appointment::new("Miles Okafor", vec!["CFO".to_string()], "2025-02-01");
    other.appointee_email = Some("miles.okafor@lakeshore.example".to_string());
    SqliteAppointmentRepository::new(&conn)
        .create_appointment(&other)
        .unwrap();

    let criteria = SweepCriteria {
        name_contains: Some("Whitfield".to_string()),
        ..SweepCriteria::default()
    };
    let report = ReconciliationSweep::new(&conn, &identity, &notifier)
        .run(&criteria)
        .unwrap();

    assert_eq!(report.found, 1);
    assert_eq!(report.results[0].appointee_name, "Dana Whitfield");

    let year = Utc::now().year();
    assert_eq!(
        SqliteResolutionRepository::new(&conn)
            .count_for_year(year)
            .unwrap(),
        1
    );
}

#[test]
fn current_year_resolution_numbers_start_at_one() {
    let conn = open_db_in_memory().unwrap();
    let resolutions = SqliteResolutionRepository::new(&conn);
    let year = Utc::now().year();
    assert_eq!(
        resolutions.next_resolution_number(year).unwrap(),
        format!("{year}-0001")
    );
}
