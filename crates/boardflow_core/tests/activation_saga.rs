use boardflow_core::db::open_db_in_memory;
use boardflow_core::external::in_memory::{
    InMemoryIdentityProvider, InMemoryObjectStore, StubPacketGenerator,
};
use boardflow_core::model::status::AppointmentStatus;
use boardflow_core::model::timeline::event_types;
use boardflow_core::repo::officer_repo::{
    OfficerDirectoryRepository, OfficerLedgerRepository, SqliteOfficerRepository,
};
use boardflow_core::repo::records_repo::{ActivationRecordsRepository, SqliteRecordsRepository};
use boardflow_core::repo::timeline_repo::{SqliteTimelineRepository, TimelineRepository};
use boardflow_core::workflow::saga::ActivationSaga;
use boardflow_core::{
    Appointment, AppointmentRepository, SqliteAppointmentRepository, WorkflowError,
};
use rusqlite::Connection;

const OFFICER_EMAIL: &str = "dana.whitfield@lakeshore.example";

fn approved_appointment(conn: &Connection) -> Appointment {
    let mut appointment =
        Appointment::new("Dana Whitfield", vec!["CEO".to_string()], "2025-01-01");
    appointment.appointee_email = Some(OFFICER_EMAIL.to_string());
    appointment.equity_included = true;
    appointment.equity_details = Some("500,000 shares".to_string());
    appointment.compensation_structure = Some("$180,000 deferred until funding".to_string());

    let repo = SqliteAppointmentRepository::new(conn);
    repo.create_appointment(&appointment).unwrap();
    assert!(repo
        .advance_status(appointment.uuid, AppointmentStatus::SecretaryApproved)
        .unwrap());
    appointment
}

#[test]
fn end_to_end_activation_creates_all_downstream_records() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let identity_id = identity.add_account(OFFICER_EMAIL, "Dana Whitfield");
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    let report = saga.run(appointment.uuid).unwrap();

    assert!(report.skipped.is_empty());
    assert!(!report.activated_at.is_empty());

    let appointments = SqliteAppointmentRepository::new(&conn);
    let loaded = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Active);
    assert!(loaded.activation_date.is_some());
    assert!(loaded
        .certificate_ref
        .as_deref()
        .unwrap()
        .starts_with("mem://certificates/"));

    let officers = SqliteOfficerRepository::new(&conn);
    let ledger = officers.list_ledger(appointment.uuid).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].title, "CEO");

    let directory = officers.list_directory(None).unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].email, OFFICER_EMAIL);

    let records = SqliteRecordsRepository::new(&conn);
    let equity = records.get_equity(appointment.uuid).unwrap().unwrap();
    assert_eq!(equity.shares_granted, 500_000.0);
    assert_eq!(equity.vesting_months, 48);
    assert_eq!(equity.holder_identity, identity_id);

    let compensation = records.get_compensation(appointment.uuid).unwrap().unwrap();
    assert_eq!(compensation.base_salary, 180_000.0);
    assert!(compensation.is_deferred);
    assert!(compensation.activated_at.is_none());

    let banking = records
        .get_banking_authority(appointment.uuid)
        .unwrap()
        .unwrap();
    assert!(banking.can_sign_wires);
    assert!(banking.can_sign_checks);
    assert!(banking.can_access_treasury_portal);
    assert_eq!(banking.status, "PENDING_BANK_UPLOAD");
    assert!(banking.packet_ref.is_some());

    assert!(records.get_compliance(appointment.uuid).unwrap().is_some());
    assert!(records.access_account_exists(identity_id).unwrap());

    let timeline = SqliteTimelineRepository::new(&conn)
        .list_for_appointment(appointment.uuid)
        .unwrap();
    assert_eq!(timeline[0].event_type, event_types::ACTIVATION_STARTED);
    assert_eq!(
        timeline.last().unwrap().event_type,
        event_types::OFFICER_ACTIVATED
    );
    assert!(timeline
        .iter()
        .any(|event| event.event_type == event_types::EQUITY_ACTIVATED));
}

#[test]
fn repeated_activation_is_idempotent_for_ledger_and_directory() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new().with_account(OFFICER_EMAIL, "Dana Whitfield");
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    saga.run(appointment.uuid).unwrap();
    saga.run(appointment.uuid).unwrap();

    let officers = SqliteOfficerRepository::new(&conn);
    assert_eq!(officers.list_ledger(appointment.uuid).unwrap().len(), 1);
    assert_eq!(officers.list_directory(None).unwrap().len(), 1);

    let records = SqliteRecordsRepository::new(&conn);
    assert!(records.equity_exists(appointment.uuid).unwrap());
    assert!(records.compensation_exists(appointment.uuid).unwrap());
    assert!(records.banking_authority_exists(appointment.uuid).unwrap());
}

#[test]
fn second_directory_upsert_wins_with_latest_fields() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new().with_account(OFFICER_EMAIL, "Dana Whitfield");
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    saga.run(appointment.uuid).unwrap();

    let appointments = SqliteAppointmentRepository::new(&conn);
    let mut updated = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    updated.appointee_name = "Dana Whitfield-Cross".to_string();
    appointments.update_appointment(&updated).unwrap();

    saga.run(appointment.uuid).unwrap();

    let directory = SqliteOfficerRepository::new(&conn).list_directory(None).unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].name, "Dana Whitfield-Cross");
}

#[test]
fn critical_failure_at_certificate_aborts_with_activating_status() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new().with_account(OFFICER_EMAIL, "Dana Whitfield");
    let store = InMemoryObjectStore::new();
    store.set_fail(true);
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    let err = saga.run(appointment.uuid).unwrap_err();

    match err {
        WorkflowError::CriticalStep { step, .. } => assert_eq!(step, "generate_certificate"),
        other => panic!("unexpected error: {other}"),
    }

    let appointments = SqliteAppointmentRepository::new(&conn);
    let loaded = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Activating);

    let officers = SqliteOfficerRepository::new(&conn);
    assert!(officers.list_ledger(appointment.uuid).unwrap().is_empty());

    // Re-run after the store recovers; the saga converges to ACTIVE.
    store.set_fail(false);
    saga.run(appointment.uuid).unwrap();
    let loaded = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Active);
}

#[test]
fn role_assignment_failure_degrades_without_aborting() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new().with_account(OFFICER_EMAIL, "Dana Whitfield");
    identity.set_fail_assign_role(true);
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    let report = saga.run(appointment.uuid).unwrap();

    assert!(report.skipped.iter().any(|s| s.step == "system_roles"));

    let appointments = SqliteAppointmentRepository::new(&conn);
    let loaded = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Active);

    // Steps 1-3 and 5-9 still ran.
    let officers = SqliteOfficerRepository::new(&conn);
    assert_eq!(officers.list_ledger(appointment.uuid).unwrap().len(), 1);
    let records = SqliteRecordsRepository::new(&conn);
    assert!(records.equity_exists(appointment.uuid).unwrap());
    assert!(records.banking_authority_exists(appointment.uuid).unwrap());
    assert!(records.compliance_exists(appointment.uuid).unwrap());

    let timeline = SqliteTimelineRepository::new(&conn)
        .list_for_appointment(appointment.uuid)
        .unwrap();
    assert!(!timeline
        .iter()
        .any(|event| event.event_type == event_types::ROLES_ASSIGNED));
    assert!(timeline
        .iter()
        .any(|event| event.event_type == event_types::ACCESS_PROVISIONED));
}

#[test]
fn missing_identity_skips_identity_bound_steps() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new();
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    let saga = ActivationSaga::new(&conn, &identity, &store, &packets);
    let report = saga.run(appointment.uuid).unwrap();

    // Identity-bound steps skip with a warning but do not fail.
    assert!(report.skipped.is_empty());

    let records = SqliteRecordsRepository::new(&conn);
    assert!(!records.equity_exists(appointment.uuid).unwrap());
    assert!(!records.compensation_exists(appointment.uuid).unwrap());
    // Banking authority does not need the identity, only the directory id.
    assert!(records.banking_authority_exists(appointment.uuid).unwrap());

    let loaded = SqliteAppointmentRepository::new(&conn)
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Active);
}

#[test]
fn statuses_never_regress() {
    let conn = open_db_in_memory().unwrap();
    let identity = InMemoryIdentityProvider::new().with_account(OFFICER_EMAIL, "Dana Whitfield");
    let store = InMemoryObjectStore::new();
    let packets = StubPacketGenerator::new();

    let appointment = approved_appointment(&conn);
    ActivationSaga::new(&conn, &identity, &store, &packets)
        .run(appointment.uuid)
        .unwrap();

    let appointments = SqliteAppointmentRepository::new(&conn);
    for target in [
        AppointmentStatus::Draft,
        AppointmentStatus::SecretaryApproved,
        AppointmentStatus::Activating,
        AppointmentStatus::Active,
    ] {
        assert!(!appointments.advance_status(appointment.uuid, target).unwrap());
    }
    let loaded = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, AppointmentStatus::Active);
}
