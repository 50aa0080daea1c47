use boardflow_core::db::open_db_in_memory;
use boardflow_core::model::document::SigningStatus;
use boardflow_core::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use boardflow_core::template::engine::{DocumentEngine, TemplateContext, TemplateError};
use boardflow_core::template::registry::{lookup, TemplateId};
use boardflow_core::{Appointment, AppointmentRepository, SqliteAppointmentRepository};
use serde_json::json;

fn context(entries: &[(&str, &str)]) -> TemplateContext {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
}

#[test]
fn builtin_fallback_renders_when_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let engine = DocumentEngine::new(&conn);

    let rendered = engine
        .render(
            TemplateId::OfficerAcceptance,
            &context(&[
                ("officer_name", "Dana Whitfield"),
                ("officer_title", "CEO"),
                ("company_name", "Lakeshore Provisions, Inc."),
                ("effective_date", "January 1, 2025"),
            ]),
        )
        .unwrap();

    assert!(rendered.contains("Dana Whitfield"));
    assert!(rendered.contains("Lakeshore Provisions, Inc."));
    assert!(!rendered.contains("{{officer_name}}"));
}

#[test]
fn stored_body_overrides_the_builtin() {
    let conn = open_db_in_memory().unwrap();
    let documents = SqliteDocumentRepository::new(&conn);
    documents
        .set_template_body(
            TemplateId::OfficerAcceptance.as_str(),
            "<p>Custom acceptance for {{officer_name}}</p>",
        )
        .unwrap();

    let rendered = DocumentEngine::new(&conn)
        .render(
            TemplateId::OfficerAcceptance,
            &context(&[("officer_name", "Dana Whitfield")]),
        )
        .unwrap();

    assert_eq!(rendered, "<p>Custom acceptance for Dana Whitfield</p>");
}

#[test]
fn replacing_a_stored_body_takes_effect() {
    let conn = open_db_in_memory().unwrap();
    let documents = SqliteDocumentRepository::new(&conn);
    let id = TemplateId::BankingResolution.as_str();

    documents.set_template_body(id, "<p>first</p>").unwrap();
    documents.set_template_body(id, "<p>second</p>").unwrap();

    let rendered = DocumentEngine::new(&conn)
        .render(TemplateId::BankingResolution, &TemplateContext::new())
        .unwrap();
    assert_eq!(rendered, "<p>second</p>");
}

#[test]
fn unknown_template_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = DocumentEngine::new(&conn)
        .render_by_name("letter_of_marque", &TemplateContext::new())
        .unwrap_err();

    match err {
        TemplateError::UnknownTemplate(name) => assert_eq!(name, "letter_of_marque"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn persisted_documents_start_pending_and_unsigned() {
    let conn = open_db_in_memory().unwrap();
    let appointment = Appointment::new("Dana Whitfield", vec!["CEO".to_string()], "2025-01-01");
    SqliteAppointmentRepository::new(&conn)
        .create_appointment(&appointment)
        .unwrap();

    let engine = DocumentEngine::new(&conn);
    let meta = lookup(TemplateId::OfficerAcceptance);
    let body = engine
        .render(
            TemplateId::OfficerAcceptance,
            &context(&[("officer_name", "Dana Whitfield")]),
        )
        .unwrap();
    let document_id = engine
        .persist(Some(appointment.uuid), meta, body)
        .unwrap();

    let documents = SqliteDocumentRepository::new(&conn);
    let stored = documents.get_document(document_id).unwrap().unwrap();
    assert_eq!(stored.signing_status, SigningStatus::Pending);
    assert!(stored.signers.is_empty());
    assert_eq!(stored.appointment_id, Some(appointment.uuid));
    assert_eq!(stored.doc_type, "multi_role_officer_acceptance");

    let linked = documents.list_for_appointment(appointment.uuid).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].uuid, document_id);
}

#[test]
fn dollar_amounts_in_values_render_literally() {
    let conn = open_db_in_memory().unwrap();
    let documents = SqliteDocumentRepository::new(&conn);
    documents
        .set_template_body(
            TemplateId::OfficerAcceptance.as_str(),
            "<p>Salary: {{salary}}</p>",
        )
        .unwrap();

    let rendered = DocumentEngine::new(&conn)
        .render(
            TemplateId::OfficerAcceptance,
            &context(&[("salary", "$180,000")]),
        )
        .unwrap();
    assert_eq!(rendered, "<p>Salary: $180,000</p>");
}

#[test]
fn every_catalog_template_has_a_builtin_body() {
    let conn = open_db_in_memory().unwrap();
    let engine = DocumentEngine::new(&conn);
    for id in TemplateId::ALL {
        assert!(
            engine.load_body(id).is_ok(),
            "missing builtin body for {}",
            id.as_str()
        );
    }
}
