//! Company settings storage with code-level defaults.

use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub const SETTING_COMPANY_NAME: &str = "company_name";
pub const SETTING_STATE_OF_INCORPORATION: &str = "state_of_incorporation";
pub const SETTING_REGISTERED_OFFICE: &str = "registered_office";

const DEFAULT_COMPANY_NAME: &str = "Lakeshore Provisions, Inc.";
const DEFAULT_STATE_OF_INCORPORATION: &str = "Delaware";
const DEFAULT_REGISTERED_OFFICE: &str = "1209 Orange Street, Wilmington, DE 19801";

/// Company-level settings used by document rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySettings {
    pub company_name: String,
    pub state_of_incorporation: String,
    pub registered_office: String,
}

/// SQLite-backed settings repository. Missing keys fall back to the
/// code-level defaults so rendering never blocks on configuration.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT setting_value FROM company_settings WHERE setting_key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO company_settings (setting_key, setting_value)
             VALUES (?1, ?2)
             ON CONFLICT (setting_key) DO UPDATE SET setting_value = excluded.setting_value;",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn company_settings(&self) -> RepoResult<CompanySettings> {
        Ok(CompanySettings {
            company_name: self
                .get(SETTING_COMPANY_NAME)?
                .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
            state_of_incorporation: self
                .get(SETTING_STATE_OF_INCORPORATION)?
                .unwrap_or_else(|| DEFAULT_STATE_OF_INCORPORATION.to_string()),
            registered_office: self
                .get(SETTING_REGISTERED_OFFICE)?
                .unwrap_or_else(|| DEFAULT_REGISTERED_OFFICE.to_string()),
        })
    }
}
