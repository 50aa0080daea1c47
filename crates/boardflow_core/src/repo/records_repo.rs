//! Downstream activation record storage.
//!
//! # Responsibility
//! - Persist equity, compensation, banking-authority, compliance, access
//!   account and onboarding records created during activation.
//!
//! # Invariants
//! - Each record kind is created at most once per appointment (or identity,
//!   for access accounts); callers check `*_exists` before inserting so a
//!   repeated saga run converges instead of conflicting.

use crate::model::appointment::AppointmentId;
use crate::model::records::{
    AccessAccount, BankingAuthority, CompensationEntry, CompensationTrigger, ComplianceRecord,
    EquityEntry, IdentityId, OnboardingChecklist,
};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for activation side-effect records.
pub trait ActivationRecordsRepository {
    fn equity_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool>;
    fn insert_equity(&self, entry: &EquityEntry) -> RepoResult<Uuid>;
    fn get_equity(&self, appointment_id: AppointmentId) -> RepoResult<Option<EquityEntry>>;

    fn compensation_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool>;
    fn insert_compensation(&self, entry: &CompensationEntry) -> RepoResult<Uuid>;
    fn get_compensation(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<CompensationEntry>>;

    fn banking_authority_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool>;
    fn insert_banking_authority(&self, authority: &BankingAuthority) -> RepoResult<Uuid>;
    fn get_banking_authority(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<BankingAuthority>>;

    fn compliance_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool>;
    fn insert_compliance(&self, record: &ComplianceRecord) -> RepoResult<Uuid>;
    fn get_compliance(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<ComplianceRecord>>;

    fn access_account_exists(&self, identity_id: IdentityId) -> RepoResult<bool>;
    fn insert_access_account(&self, account: &AccessAccount) -> RepoResult<Uuid>;

    /// Inserts or refreshes the per-appointment onboarding checklist.
    fn upsert_onboarding(&self, checklist: &OnboardingChecklist) -> RepoResult<Uuid>;
    fn get_onboarding(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<OnboardingChecklist>>;
}

/// SQLite-backed activation records repository.
pub struct SqliteRecordsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists_for_appointment(
        &self,
        table: &'static str,
        appointment_id: AppointmentId,
    ) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE appointment_id = ?1;"),
            [appointment_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl ActivationRecordsRepository for SqliteRecordsRepository<'_> {
    fn equity_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool> {
        self.exists_for_appointment("equity_entries", appointment_id)
    }

    fn insert_equity(&self, entry: &EquityEntry) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO equity_entries (
                uuid,
                appointment_id,
                holder_identity,
                shares_granted,
                vesting_start,
                vesting_months
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.uuid.to_string(),
                entry.appointment_id.to_string(),
                entry.holder_identity.to_string(),
                entry.shares_granted,
                entry.vesting_start.as_str(),
                entry.vesting_months,
            ],
        )?;
        Ok(entry.uuid)
    }

    fn get_equity(&self, appointment_id: AppointmentId) -> RepoResult<Option<EquityEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, appointment_id, holder_identity, shares_granted,
                    vesting_start, vesting_months
             FROM equity_entries
             WHERE appointment_id = ?1;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_equity_row(row)?));
        }

        Ok(None)
    }

    fn compensation_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool> {
        self.exists_for_appointment("compensation_entries", appointment_id)
    }

    fn insert_compensation(&self, entry: &CompensationEntry) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO compensation_entries (
                uuid,
                appointment_id,
                identity_id,
                base_salary,
                is_deferred,
                trigger_status,
                activated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.uuid.to_string(),
                entry.appointment_id.to_string(),
                entry.identity_id.to_string(),
                entry.base_salary,
                bool_to_int(entry.is_deferred),
                trigger_to_db(entry.trigger_status),
                entry.activated_at.as_deref(),
            ],
        )?;
        Ok(entry.uuid)
    }

    fn get_compensation(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<CompensationEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, appointment_id, identity_id, base_salary, is_deferred,
                    trigger_status, activated_at
             FROM compensation_entries
             WHERE appointment_id = ?1;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_compensation_row(row)?));
        }

        Ok(None)
    }

    fn banking_authority_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool> {
        self.exists_for_appointment("banking_authority", appointment_id)
    }

    fn insert_banking_authority(&self, authority: &BankingAuthority) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO banking_authority (
                uuid,
                appointment_id,
                officer_id,
                role,
                can_sign_wires,
                can_sign_checks,
                can_access_treasury_portal,
                status,
                packet_ref
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                authority.uuid.to_string(),
                authority.appointment_id.to_string(),
                authority.officer_id.to_string(),
                authority.role.as_str(),
                bool_to_int(authority.can_sign_wires),
                bool_to_int(authority.can_sign_checks),
                bool_to_int(authority.can_access_treasury_portal),
                authority.status.as_str(),
                authority.packet_ref.as_deref(),
            ],
        )?;
        Ok(authority.uuid)
    }

    fn get_banking_authority(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<BankingAuthority>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, appointment_id, officer_id, role, can_sign_wires,
                    can_sign_checks, can_access_treasury_portal, status, packet_ref
             FROM banking_authority
             WHERE appointment_id = ?1;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_banking_row(row)?));
        }

        Ok(None)
    }

    fn compliance_exists(&self, appointment_id: AppointmentId) -> RepoResult<bool> {
        self.exists_for_appointment("compliance_records", appointment_id)
    }

    fn insert_compliance(&self, record: &ComplianceRecord) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO compliance_records (
                uuid,
                appointment_id,
                identity_id,
                nda_signed,
                conflict_form_signed,
                identity_verified,
                background_verified,
                insurance_coverage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                record.uuid.to_string(),
                record.appointment_id.to_string(),
                record.identity_id.to_string(),
                bool_to_int(record.nda_signed),
                bool_to_int(record.conflict_form_signed),
                bool_to_int(record.identity_verified),
                bool_to_int(record.background_verified),
                bool_to_int(record.insurance_coverage),
            ],
        )?;
        Ok(record.uuid)
    }

    fn get_compliance(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<ComplianceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, appointment_id, identity_id, nda_signed, conflict_form_signed,
                    identity_verified, background_verified, insurance_coverage
             FROM compliance_records
             WHERE appointment_id = ?1;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_compliance_row(row)?));
        }

        Ok(None)
    }

    fn access_account_exists(&self, identity_id: IdentityId) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM access_accounts WHERE identity_id = ?1;",
            [identity_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_access_account(&self, account: &AccessAccount) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO access_accounts (
                uuid,
                identity_id,
                role,
                access_level,
                title,
                department
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                account.uuid.to_string(),
                account.identity_id.to_string(),
                account.role.as_str(),
                account.access_level,
                account.title.as_str(),
                account.department.as_str(),
            ],
        )?;
        Ok(account.uuid)
    }

    fn upsert_onboarding(&self, checklist: &OnboardingChecklist) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO executive_onboarding (
                uuid,
                appointment_id,
                identity_id,
                status,
                documents_required,
                documents_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (appointment_id) DO UPDATE SET
                identity_id = excluded.identity_id,
                status = excluded.status,
                documents_required = excluded.documents_required,
                documents_completed = excluded.documents_completed;",
            params![
                checklist.uuid.to_string(),
                checklist.appointment_id.to_string(),
                checklist.identity_id.map(|id| id.to_string()),
                checklist.status.as_str(),
                serde_json::to_string(&checklist.documents_required)?,
                serde_json::to_string(&checklist.documents_completed)?,
            ],
        )?;

        let uuid_text: String = self.conn.query_row(
            "SELECT uuid FROM executive_onboarding WHERE appointment_id = ?1;",
            [checklist.appointment_id.to_string()],
            |row| row.get(0),
        )?;
        parse_uuid(&uuid_text, "executive_onboarding.uuid")
    }

    fn get_onboarding(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Option<OnboardingChecklist>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, appointment_id, identity_id, status,
                        documents_required, documents_completed
                 FROM executive_onboarding
                 WHERE appointment_id = ?1;",
                [appointment_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("appointment_id")?,
                        row.get::<_, Option<String>>("identity_id")?,
                        row.get::<_, String>("status")?,
                        row.get::<_, String>("documents_required")?,
                        row.get::<_, String>("documents_completed")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid, appointment, identity, status, required, completed)) = row else {
            return Ok(None);
        };

        let identity_id = match identity {
            Some(value) => Some(parse_uuid(&value, "executive_onboarding.identity_id")?),
            None => None,
        };

        Ok(Some(OnboardingChecklist {
            uuid: parse_uuid(&uuid, "executive_onboarding.uuid")?,
            appointment_id: parse_uuid(&appointment, "executive_onboarding.appointment_id")?,
            identity_id,
            status,
            documents_required: serde_json::from_str(&required)?,
            documents_completed: serde_json::from_str(&completed)?,
        }))
    }
}

fn parse_equity_row(row: &Row<'_>) -> RepoResult<EquityEntry> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;
    let holder_text: String = row.get("holder_identity")?;

    Ok(EquityEntry {
        uuid: parse_uuid(&uuid_text, "equity_entries.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "equity_entries.appointment_id")?,
        holder_identity: parse_uuid(&holder_text, "equity_entries.holder_identity")?,
        shares_granted: row.get("shares_granted")?,
        vesting_start: row.get("vesting_start")?,
        vesting_months: row.get("vesting_months")?,
    })
}

fn parse_compensation_row(row: &Row<'_>) -> RepoResult<CompensationEntry> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;
    let identity_text: String = row.get("identity_id")?;

    let trigger_text: String = row.get("trigger_status")?;
    let trigger_status = parse_trigger(&trigger_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid trigger status `{trigger_text}` in compensation_entries.trigger_status"
        ))
    })?;

    Ok(CompensationEntry {
        uuid: parse_uuid(&uuid_text, "compensation_entries.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "compensation_entries.appointment_id")?,
        identity_id: parse_uuid(&identity_text, "compensation_entries.identity_id")?,
        base_salary: row.get("base_salary")?,
        is_deferred: int_to_bool(row.get("is_deferred")?, "compensation_entries.is_deferred")?,
        trigger_status,
        activated_at: row.get("activated_at")?,
    })
}

fn parse_banking_row(row: &Row<'_>) -> RepoResult<BankingAuthority> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;
    let officer_text: String = row.get("officer_id")?;

    Ok(BankingAuthority {
        uuid: parse_uuid(&uuid_text, "banking_authority.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "banking_authority.appointment_id")?,
        officer_id: parse_uuid(&officer_text, "banking_authority.officer_id")?,
        role: row.get("role")?,
        can_sign_wires: int_to_bool(row.get("can_sign_wires")?, "banking_authority.can_sign_wires")?,
        can_sign_checks: int_to_bool(
            row.get("can_sign_checks")?,
            "banking_authority.can_sign_checks",
        )?,
        can_access_treasury_portal: int_to_bool(
            row.get("can_access_treasury_portal")?,
            "banking_authority.can_access_treasury_portal",
        )?,
        status: row.get("status")?,
        packet_ref: row.get("packet_ref")?,
    })
}

fn parse_compliance_row(row: &Row<'_>) -> RepoResult<ComplianceRecord> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;
    let identity_text: String = row.get("identity_id")?;

    Ok(ComplianceRecord {
        uuid: parse_uuid(&uuid_text, "compliance_records.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "compliance_records.appointment_id")?,
        identity_id: parse_uuid(&identity_text, "compliance_records.identity_id")?,
        nda_signed: int_to_bool(row.get("nda_signed")?, "compliance_records.nda_signed")?,
        conflict_form_signed: int_to_bool(
            row.get("conflict_form_signed")?,
            "compliance_records.conflict_form_signed",
        )?,
        identity_verified: int_to_bool(
            row.get("identity_verified")?,
            "compliance_records.identity_verified",
        )?,
        background_verified: int_to_bool(
            row.get("background_verified")?,
            "compliance_records.background_verified",
        )?,
        insurance_coverage: int_to_bool(
            row.get("insurance_coverage")?,
            "compliance_records.insurance_coverage",
        )?,
    })
}

pub fn trigger_to_db(status: CompensationTrigger) -> &'static str {
    match status {
        CompensationTrigger::Active => "ACTIVE",
        CompensationTrigger::Pending => "PENDING",
    }
}

pub fn parse_trigger(value: &str) -> Option<CompensationTrigger> {
    match value {
        "ACTIVE" => Some(CompensationTrigger::Active),
        "PENDING" => Some(CompensationTrigger::Pending),
        _ => None,
    }
}
