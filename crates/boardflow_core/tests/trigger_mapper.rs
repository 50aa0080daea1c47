use boardflow_core::db::open_db_in_memory;
use boardflow_core::external::in_memory::RecordingNotifier;
use boardflow_core::model::document::SigningStatus;
use boardflow_core::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use boardflow_core::repo::records_repo::{ActivationRecordsRepository, SqliteRecordsRepository};
use boardflow_core::repo::resolution_repo::{ResolutionRepository, SqliteResolutionRepository};
use boardflow_core::workflow::triggers::TriggerMapper;
use boardflow_core::{
    Appointment, AppointmentRepository, GovernanceEvent, SqliteAppointmentRepository,
};
use chrono::{Datelike, Utc};
use rusqlite::Connection;

fn stored_appointment(conn: &Connection, titles: &[&str]) -> Appointment {
    let mut appointment = Appointment::new(
        "Dana Whitfield",
        titles.iter().map(|t| t.to_string()).collect(),
        "2025-01-01",
    );
    appointment.appointee_email = Some("dana.whitfield@lakeshore.example".to_string());
    SqliteAppointmentRepository::new(conn)
        .create_appointment(&appointment)
        .unwrap();
    appointment
}

#[test]
fn ceo_appointment_generates_three_documents() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let appointment = stored_appointment(&conn, &["CEO"]);

    let document_ids = TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        })
        .unwrap();

    assert_eq!(document_ids.len(), 3);

    let documents = SqliteDocumentRepository::new(&conn)
        .list_for_appointment(appointment.uuid)
        .unwrap();
    assert_eq!(documents.len(), 3);
    for document in &documents {
        assert_eq!(document.signing_status, SigningStatus::Pending);
        assert!(document.signers.is_empty());
        assert!(
            document.body.contains("Dana Whitfield"),
            "officer name not interpolated into {}",
            document.title
        );
    }
}

#[test]
fn non_ceo_appointment_generates_two_documents() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let appointment = stored_appointment(&conn, &["Chief Financial Officer"]);

    let document_ids = TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        })
        .unwrap();

    assert_eq!(document_ids.len(), 2);
}

#[test]
fn draft_resolution_is_created_and_linked_once() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let appointment = stored_appointment(&conn, &["CEO"]);

    let mapper = TriggerMapper::new(&conn, &notifier);
    let event = GovernanceEvent::OfficerAppointment {
        appointment_id: appointment.uuid,
    };
    mapper.run(&event).unwrap();

    let appointments = SqliteAppointmentRepository::new(&conn);
    let linked = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    let resolution_id = linked.resolution_id.expect("resolution should be linked");

    let resolutions = SqliteResolutionRepository::new(&conn);
    let resolution = resolutions.get_resolution(resolution_id).unwrap().unwrap();
    let year = Utc::now().year();
    assert_eq!(resolution.resolution_number, format!("{year}-0001"));

    // A second trigger reuses the linked resolution.
    mapper.run(&event).unwrap();
    let relinked = appointments
        .get_appointment(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(relinked.resolution_id, Some(resolution_id));
    assert_eq!(resolutions.count_for_year(year).unwrap(), 1);
}

#[test]
fn onboarding_checklist_lists_required_templates() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let appointment = stored_appointment(&conn, &["CEO"]);

    TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        })
        .unwrap();

    let checklist = SqliteRecordsRepository::new(&conn)
        .get_onboarding(appointment.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(checklist.status, "pending");
    assert_eq!(
        checklist.documents_required,
        vec![
            "officer_appointment_resolution".to_string(),
            "officer_acceptance".to_string(),
            "ceo_appointment_resolution".to_string(),
        ]
    );
    assert!(checklist.documents_completed.is_empty());
}

#[test]
fn appointee_is_notified_once_with_generated_ids() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let appointment = stored_appointment(&conn, &["CEO"]);

    let document_ids = TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        })
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, appointment.uuid);
    assert_eq!(sent[0].1, document_ids);
}

#[test]
fn notification_failure_does_not_fail_the_trigger() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    notifier.set_fail(true);
    let appointment = stored_appointment(&conn, &["CEO"]);

    let document_ids = TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        })
        .unwrap();

    assert_eq!(document_ids.len(), 3);
    assert!(notifier.sent().is_empty());
}

#[test]
fn initial_board_setup_generates_unlinked_documents() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();

    let document_ids = TriggerMapper::new(&conn, &notifier)
        .run(&GovernanceEvent::InitialBoardSetup {
            director_name: "Dana Whitfield".to_string(),
            director_email: "dana.whitfield@lakeshore.example".to_string(),
        })
        .unwrap();

    assert_eq!(document_ids.len(), 2);
    let documents = SqliteDocumentRepository::new(&conn);
    for id in &document_ids {
        let document = documents.get_document(*id).unwrap().unwrap();
        assert!(document.appointment_id.is_none());
        assert!(document.body.contains("Dana Whitfield"));
    }
    assert!(notifier.sent().is_empty());
}
