//! In-memory collaborator implementations with failure injection, used by
//! integration tests and local smoke runs.

use crate::external::{
    BankingPacketGenerator, ExternalError, ExternalResult, IdentityAccount, IdentityProvider,
    NotificationSender, ObjectStore,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct IdentityState {
    accounts: Vec<IdentityAccount>,
    roles: Vec<(Uuid, String)>,
    fail_create: bool,
    fail_assign_role: bool,
    /// When set, `create_account` refuses with AlreadyExists even though the
    /// exact lookup missed, mimicking a provider-side uniqueness race.
    create_conflicts: bool,
}

/// Mutex-guarded identity provider backed by a plain account list.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<IdentityState>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, name: &str) -> Self {
        self.add_account(email, name);
        self
    }

    /// Seeds an account and returns its id.
    pub fn add_account(&self, email: &str, name: &str) -> Uuid {
        let account = IdentityAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
        };
        let id = account.id;
        self.state.lock().unwrap().accounts.push(account);
        id
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub fn set_fail_assign_role(&self, fail: bool) {
        self.state.lock().unwrap().fail_assign_role = fail;
    }

    pub fn set_create_conflicts(&self, conflicts: bool) {
        self.state.lock().unwrap().create_conflicts = conflicts;
    }

    pub fn roles_for(&self, identity_id: Uuid) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .roles
            .iter()
            .filter(|(id, _)| *id == identity_id)
            .map(|(_, role)| role.clone())
            .collect()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn find_by_email(&self, email: &str) -> ExternalResult<Option<IdentityAccount>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|account| account.email == email)
            .cloned())
    }

    fn find_by_email_ci(&self, email: &str) -> ExternalResult<Option<IdentityAccount>> {
        let needle = email.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|account| account.email.to_lowercase() == needle)
            .cloned())
    }

    fn scan_by_email(&self, email: &str) -> ExternalResult<Option<IdentityAccount>> {
        let needle = email.trim().to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|account| account.email.trim().to_lowercase() == needle)
            .cloned())
    }

    fn create_account(&self, email: &str, name: &str) -> ExternalResult<IdentityAccount> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(ExternalError::Unavailable {
                service: "identity provider",
                message: "injected create failure".to_string(),
            });
        }
        if state.create_conflicts
            || state
                .accounts
                .iter()
                .any(|account| account.email.to_lowercase() == email.to_lowercase())
        {
            return Err(ExternalError::AlreadyExists(email.to_string()));
        }
        let account = IdentityAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    fn assign_role(&self, identity_id: Uuid, role: &str) -> ExternalResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_assign_role {
            return Err(ExternalError::Unavailable {
                service: "identity provider",
                message: "injected role assignment failure".to_string(),
            });
        }
        let pair = (identity_id, role.to_string());
        if !state.roles.contains(&pair) {
            state.roles.push(pair);
        }
        Ok(())
    }
}

/// Object store mapping keys to bodies, returning `mem://{key}` references.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    state: Mutex<(BTreeMap<String, String>, bool)>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.lock().unwrap().1 = fail;
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().0.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, key: &str, body: &str) -> ExternalResult<String> {
        let mut state = self.state.lock().unwrap();
        if state.1 {
            return Err(ExternalError::Unavailable {
                service: "object store",
                message: "injected store failure".to_string(),
            });
        }
        state.0.insert(key.to_string(), body.to_string());
        Ok(format!("mem://{key}"))
    }
}

/// Records notifications instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    state: Mutex<(Vec<(Uuid, Vec<Uuid>)>, bool)>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.lock().unwrap().1 = fail;
    }

    pub fn sent(&self) -> Vec<(Uuid, Vec<Uuid>)> {
        self.state.lock().unwrap().0.clone()
    }
}

impl NotificationSender for RecordingNotifier {
    fn notify_documents_ready(
        &self,
        appointment_id: Uuid,
        document_ids: &[Uuid],
    ) -> ExternalResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.1 {
            return Err(ExternalError::Unavailable {
                service: "notification sender",
                message: "injected notify failure".to_string(),
            });
        }
        state.0.push((appointment_id, document_ids.to_vec()));
        Ok(())
    }
}

/// Deterministic packet generator with an injectable failure switch.
#[derive(Debug, Default)]
pub struct StubPacketGenerator {
    fail: Mutex<bool>,
}

impl StubPacketGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl BankingPacketGenerator for StubPacketGenerator {
    fn generate_packet(&self, appointment_id: Uuid) -> ExternalResult<String> {
        if *self.fail.lock().unwrap() {
            return Err(ExternalError::Unavailable {
                service: "banking packet generator",
                message: "injected packet failure".to_string(),
            });
        }
        Ok(format!("packets/appointment_{appointment_id}.pdf"))
    }
}
