//! Immutable governance template catalog.
//!
//! # Responsibility
//! - Define the fixed template id set and its metadata.
//! - Map template ids to generated-document types.
//!
//! # Invariants
//! - The catalog is built once as consts and never mutated at runtime;
//!   lookups are pure.

/// Catalog template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    PreIncorporationConsent,
    InitialActionSoleDirector,
    OrgMinutesSoleDirector,
    OfficerAppointmentResolution,
    CeoAppointmentResolution,
    OfficerAcceptance,
    StockIssuanceResolution,
    CapTableExhibit,
    BankingResolution,
    RegisteredAgentResolution,
}

impl TemplateId {
    pub const ALL: [TemplateId; 10] = [
        Self::PreIncorporationConsent,
        Self::InitialActionSoleDirector,
        Self::OrgMinutesSoleDirector,
        Self::OfficerAppointmentResolution,
        Self::CeoAppointmentResolution,
        Self::OfficerAcceptance,
        Self::StockIssuanceResolution,
        Self::CapTableExhibit,
        Self::BankingResolution,
        Self::RegisteredAgentResolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreIncorporationConsent => "pre_incorporation_consent",
            Self::InitialActionSoleDirector => "initial_action_sole_director",
            Self::OrgMinutesSoleDirector => "org_minutes_sole_director",
            Self::OfficerAppointmentResolution => "officer_appointment_resolution",
            Self::CeoAppointmentResolution => "ceo_appointment_resolution",
            Self::OfficerAcceptance => "officer_acceptance",
            Self::StockIssuanceResolution => "stock_issuance_resolution",
            Self::CapTableExhibit => "cap_table_exhibit",
            Self::BankingResolution => "banking_resolution",
            Self::RegisteredAgentResolution => "registered_agent_resolution",
        }
    }

    pub fn parse(value: &str) -> Option<TemplateId> {
        match value {
            "pre_incorporation_consent" => Some(Self::PreIncorporationConsent),
            "initial_action_sole_director" => Some(Self::InitialActionSoleDirector),
            "org_minutes_sole_director" => Some(Self::OrgMinutesSoleDirector),
            "officer_appointment_resolution" => Some(Self::OfficerAppointmentResolution),
            "ceo_appointment_resolution" => Some(Self::CeoAppointmentResolution),
            "officer_acceptance" => Some(Self::OfficerAcceptance),
            "stock_issuance_resolution" => Some(Self::StockIssuanceResolution),
            "cap_table_exhibit" => Some(Self::CapTableExhibit),
            "banking_resolution" => Some(Self::BankingResolution),
            "registered_agent_resolution" => Some(Self::RegisteredAgentResolution),
            _ => None,
        }
    }

    /// Generated-document type for this template; unmapped ids collapse to
    /// the generic `board_resolution` type.
    pub fn doc_type(self) -> &'static str {
        match self {
            Self::PreIncorporationConsent => "initial_director_consent",
            Self::InitialActionSoleDirector => "initial_director_consent",
            Self::OrgMinutesSoleDirector => "board_minutes",
            Self::OfficerAppointmentResolution => "officer_appointment_resolution",
            Self::CeoAppointmentResolution => "ceo_appointment_resolution",
            Self::OfficerAcceptance => "multi_role_officer_acceptance",
            Self::StockIssuanceResolution => "stock_issuance_resolution",
            Self::CapTableExhibit => "capitalization_table_exhibit",
            Self::BankingResolution => "corporate_banking_resolution",
            Self::RegisteredAgentResolution => "board_resolution",
        }
    }
}

/// Template grouping tags, used by listing surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Governance,
    Board,
    Executive,
    Equity,
    Compliance,
}

/// Governance events a template is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerFlags {
    pub pre_incorporation: bool,
    pub on_director_create: bool,
    pub on_officer_appointment: bool,
    pub on_ceo_appointment: bool,
    pub on_equity_setup: bool,
    pub on_banking_setup: bool,
    pub on_registered_agent_setup: bool,
}

const NO_TRIGGERS: TriggerFlags = TriggerFlags {
    pre_incorporation: false,
    on_director_create: false,
    on_officer_appointment: false,
    on_ceo_appointment: false,
    on_equity_setup: false,
    on_banking_setup: false,
    on_registered_agent_setup: false,
};

/// Catalog entry for one template. Read-only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateMeta {
    pub id: TemplateId,
    pub title: &'static str,
    pub description: &'static str,
    pub categories: &'static [TemplateCategory],
    pub triggers: TriggerFlags,
}

pub const CATALOG: [TemplateMeta; 10] = [
    TemplateMeta {
        id: TemplateId::PreIncorporationConsent,
        title: "Pre-Incorporation Written Consent of Sole Incorporator",
        description: "Consent appointing the initial director and adopting bylaws, \
                      conditional on filing.",
        categories: &[
            TemplateCategory::Governance,
            TemplateCategory::Board,
            TemplateCategory::Compliance,
        ],
        triggers: TriggerFlags {
            pre_incorporation: true,
            on_director_create: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::InitialActionSoleDirector,
        title: "Initial Action of Sole Director",
        description: "Written consent adopting bylaws, appointing officers, and \
                      organizing the corporation.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Board],
        triggers: TriggerFlags {
            on_director_create: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::OrgMinutesSoleDirector,
        title: "Organizational Minutes of Sole Director",
        description: "Certified organizational minutes summarizing formation, officer \
                      elections, and stock issuance.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Board],
        triggers: TriggerFlags {
            on_director_create: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::OfficerAppointmentResolution,
        title: "Board Resolution: Appointment of Officers",
        description: "Resolution appointing one or more officers to specified titles.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Executive],
        triggers: TriggerFlags {
            on_officer_appointment: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::CeoAppointmentResolution,
        title: "Board Resolution: Appointment of Chief Executive Officer",
        description: "Resolution appointing a CEO with full executive authority.",
        categories: &[
            TemplateCategory::Governance,
            TemplateCategory::Executive,
            TemplateCategory::Board,
        ],
        triggers: TriggerFlags {
            on_ceo_appointment: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::OfficerAcceptance,
        title: "Officer Acceptance of Appointment",
        description: "Officer acceptance acknowledging fiduciary duties and role \
                      responsibilities.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Executive],
        triggers: TriggerFlags {
            on_officer_appointment: true,
            on_ceo_appointment: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::StockIssuanceResolution,
        title: "Stock Issuance Resolution",
        description: "Resolution authorizing issuance of founder shares and \
                      establishing the equity pool.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Equity],
        triggers: TriggerFlags {
            on_equity_setup: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::CapTableExhibit,
        title: "Capitalization Table Exhibit",
        description: "Formal cap table exhibit showing authorized, issued, and \
                      reserved shares.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Equity],
        triggers: TriggerFlags {
            on_equity_setup: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::BankingResolution,
        title: "Corporate Banking Resolution",
        description: "Board resolution authorizing officers to open and control \
                      corporate bank accounts.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Compliance],
        triggers: TriggerFlags {
            on_banking_setup: true,
            ..NO_TRIGGERS
        },
    },
    TemplateMeta {
        id: TemplateId::RegisteredAgentResolution,
        title: "Registered Agent & Registered Office Resolution",
        description: "Resolution designating the registered agent and registered \
                      office.",
        categories: &[TemplateCategory::Governance, TemplateCategory::Compliance],
        triggers: TriggerFlags {
            on_registered_agent_setup: true,
            ..NO_TRIGGERS
        },
    },
];

/// Catalog metadata for `id`. Total over the enum, so this cannot miss.
pub fn lookup(id: TemplateId) -> &'static TemplateMeta {
    CATALOG
        .iter()
        .find(|meta| meta.id == id)
        .unwrap_or(&CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::{lookup, TemplateId, CATALOG};

    #[test]
    fn catalog_covers_every_id_exactly_once() {
        for id in TemplateId::ALL {
            assert_eq!(CATALOG.iter().filter(|meta| meta.id == id).count(), 1);
            assert_eq!(lookup(id).id, id);
        }
    }

    #[test]
    fn ids_round_trip_through_strings() {
        for id in TemplateId::ALL {
            assert_eq!(TemplateId::parse(id.as_str()), Some(id));
        }
        assert_eq!(TemplateId::parse("unknown_template"), None);
    }

    #[test]
    fn unmapped_doc_type_falls_back_to_board_resolution() {
        assert_eq!(
            TemplateId::RegisteredAgentResolution.doc_type(),
            "board_resolution"
        );
    }
}
