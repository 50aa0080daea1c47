//! Built-in template bodies, the fallback source when no active row exists
//! in the primary `template_bodies` store.
//!
//! These are deliberately minimal renditions; operators load the full legal
//! text into the primary store.

use crate::template::registry::TemplateId;

/// Built-in body for `id`. Every catalog template ships a fallback body.
pub fn body(id: TemplateId) -> Option<&'static str> {
    let body = match id {
        TemplateId::PreIncorporationConsent => {
            "<h1>Pre-Incorporation Written Consent of Sole Incorporator</h1>\
             <p>The undersigned, {{incorporator_name}}, as sole incorporator of \
             {{company_name}}, a {{state_of_incorporation}} corporation, hereby \
             consents to the actions set forth herein as of {{consent_date}}.</p>"
        }
        TemplateId::InitialActionSoleDirector => {
            "<h1>Initial Action of Sole Director</h1>\
             <p>The undersigned, {{director_name}}, being the sole director of \
             {{company_name}}, adopts the bylaws and organizes the corporation \
             as of {{director_consent_date}}.</p>"
        }
        TemplateId::OrgMinutesSoleDirector => {
            "<h1>Organizational Minutes of Sole Director</h1>\
             <p>Minutes of the organizational meeting of {{company_name}}, held \
             on {{minutes_date}}, {{director_name}} presiding.</p>"
        }
        TemplateId::OfficerAppointmentResolution => {
            "<h1>Board Resolution: Appointment of Officers</h1>\
             <p>RESOLVED, that {{officer_name}} is hereby appointed to the \
             office of {{officer_title}} of {{company_name}}, effective \
             {{effective_date}}.</p>"
        }
        TemplateId::CeoAppointmentResolution => {
            "<h1>Board Resolution: Appointment of Chief Executive Officer</h1>\
             <p>RESOLVED, that {{officer_name}} is hereby appointed Chief \
             Executive Officer of {{company_name}}, with full executive \
             authority, effective {{effective_date}}.</p>"
        }
        TemplateId::OfficerAcceptance => {
            "<h1>Officer Acceptance of Appointment</h1>\
             <p>I, {{officer_name}}, accept appointment as {{officer_title}} of \
             {{company_name}} and acknowledge the fiduciary duties of the \
             office, effective {{effective_date}}.</p>"
        }
        TemplateId::StockIssuanceResolution => {
            "<h1>Stock Issuance Resolution</h1>\
             <p>RESOLVED, that {{company_name}} is authorized to issue shares \
             of its common stock as set forth in the attached schedule, dated \
             {{resolution_date}}.</p>"
        }
        TemplateId::CapTableExhibit => {
            "<h1>Capitalization Table Exhibit</h1>\
             <p>Capitalization of {{company_name}} as of {{resolution_date}}: \
             authorized, issued, and reserved shares as stated herein.</p>"
        }
        TemplateId::BankingResolution => {
            "<h1>Corporate Banking Resolution</h1>\
             <p>RESOLVED, that {{officer_name}} is authorized to open and \
             control bank accounts on behalf of {{company_name}}, dated \
             {{resolution_date}}.</p>"
        }
        TemplateId::RegisteredAgentResolution => {
            "<h1>Registered Agent &amp; Registered Office Resolution</h1>\
             <p>RESOLVED, that {{registered_agent_name}}, {{registered_agent_address}}, \
             is designated registered agent of {{company_name}} in \
             {{state_of_incorporation}}, dated {{resolution_date}}.</p>"
        }
    };
    Some(body)
}

/// Appointment certificate body rendered by the activation saga.
pub const CERTIFICATE_BODY: &str = "<h1>Certificate of Appointment</h1>\
    <p>This certifies that {{officer_name}} has been duly appointed \
    {{officer_title}} of {{company_name}}, a {{state}} corporation, effective \
    {{effective_date}}, pursuant to board resolution {{resolution_number}}.</p>\
    <p>Issued {{issued_date}}.</p>";
