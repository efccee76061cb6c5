//! Account registry: registration, login, session snapshots, display-name
//! resolution and demo seeding. Credentials are Argon2id hashes; session
//! snapshots never carry the hash.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sprout_store::{Store, keys};
use sprout_types::{ParentAccount, Role, SessionSnapshot, StudentAccount, TeacherAccount};
use tracing::info;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Clone)]
pub struct Accounts {
    store: Arc<Store>,
}

impl Accounts {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn parents(&self) -> Result<Vec<ParentAccount>, CoreError> {
        Ok(self.store.get(keys::PARENT_ACCOUNTS)?.unwrap_or_default())
    }

    fn teachers(&self) -> Result<Vec<TeacherAccount>, CoreError> {
        Ok(self.store.get(keys::TEACHER_ACCOUNTS)?.unwrap_or_default())
    }

    fn students(&self) -> Result<Vec<StudentAccount>, CoreError> {
        Ok(self.store.get(keys::STUDENT_ACCOUNTS)?.unwrap_or_default())
    }

    // -- Registration --

    pub fn register_parent(
        &self,
        name: &str,
        email: &str,
        password: &str,
        child_code: &str,
    ) -> Result<ParentAccount, CoreError> {
        let mut parents = self.parents()?;
        if parents.iter().any(|p| p.email.eq_ignore_ascii_case(email)) {
            return Err(CoreError::DuplicateAccount(email.to_string()));
        }

        let account = ParentAccount {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            child_code: child_code.to_string(),
            created_at: Utc::now(),
        };
        parents.push(account.clone());
        self.store.set(keys::PARENT_ACCOUNTS, &parents)?;

        info!("parent account registered for {}", account.email);
        Ok(account)
    }

    pub fn register_teacher(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TeacherAccount, CoreError> {
        let mut teachers = self.teachers()?;
        if teachers.iter().any(|t| t.email.eq_ignore_ascii_case(email)) {
            return Err(CoreError::DuplicateAccount(email.to_string()));
        }

        let account = TeacherAccount {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        teachers.push(account.clone());
        self.store.set(keys::TEACHER_ACCOUNTS, &teachers)?;

        info!("teacher account registered for {}", account.email);
        Ok(account)
    }

    pub fn register_student(
        &self,
        name: &str,
        student_code: &str,
        parent_email: Option<&str>,
    ) -> Result<StudentAccount, CoreError> {
        let mut students = self.students()?;
        if students
            .iter()
            .any(|s| s.student_code.eq_ignore_ascii_case(student_code))
        {
            return Err(CoreError::DuplicateAccount(student_code.to_string()));
        }

        let account = StudentAccount {
            id: Uuid::new_v4(),
            name: name.to_string(),
            student_code: student_code.to_string(),
            parent_email: parent_email.map(str::to_string),
            created_at: Utc::now(),
        };
        students.push(account.clone());
        self.store.set(keys::STUDENT_ACCOUNTS, &students)?;

        info!("student account registered for {}", account.name);
        Ok(account)
    }

    // -- Login / logout --

    pub fn login_parent(&self, email: &str, password: &str) -> Result<SessionSnapshot, CoreError> {
        let account = self
            .parents()?
            .into_iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .ok_or(CoreError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        let snapshot = SessionSnapshot {
            account_id: account.id,
            name: account.name,
            identity: account.email,
            role: Role::Parent,
            logged_in_at: Utc::now(),
        };
        self.store.set(keys::CURRENT_PARENT, &snapshot)?;

        info!("parent {} logged in", snapshot.identity);
        Ok(snapshot)
    }

    pub fn login_teacher(&self, email: &str, password: &str) -> Result<SessionSnapshot, CoreError> {
        let account = self
            .teachers()?
            .into_iter()
            .find(|t| t.email.eq_ignore_ascii_case(email))
            .ok_or(CoreError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        let snapshot = SessionSnapshot {
            account_id: account.id,
            name: account.name,
            identity: account.email,
            role: Role::Teacher,
            logged_in_at: Utc::now(),
        };
        self.store.set(keys::CURRENT_TEACHER, &snapshot)?;

        info!("teacher {} logged in", snapshot.identity);
        Ok(snapshot)
    }

    /// Students authenticate by code alone; no session key is persisted for
    /// them (the stored layout only tracks parent/teacher sessions).
    pub fn login_student(&self, student_code: &str) -> Result<SessionSnapshot, CoreError> {
        let account = self
            .students()?
            .into_iter()
            .find(|s| s.student_code.eq_ignore_ascii_case(student_code))
            .ok_or(CoreError::InvalidCredentials)?;

        Ok(SessionSnapshot {
            account_id: account.id,
            name: account.name.clone(),
            identity: account.name,
            role: Role::Student,
            logged_in_at: Utc::now(),
        })
    }

    pub fn logout(&self, role: Role) -> Result<(), CoreError> {
        match role {
            Role::Parent => self.store.delete(keys::CURRENT_PARENT)?,
            Role::Teacher => self.store.delete(keys::CURRENT_TEACHER)?,
            Role::Student => false,
        };
        Ok(())
    }

    /// The persisted session snapshot for a role, if someone is logged in.
    pub fn current(&self, role: Role) -> Result<Option<SessionSnapshot>, CoreError> {
        let key = match role {
            Role::Parent => keys::CURRENT_PARENT,
            Role::Teacher => keys::CURRENT_TEACHER,
            Role::Student => return Ok(None),
        };
        Ok(self.store.get(key)?)
    }

    // -- Display resolution --

    /// Resolve a message endpoint to a display name by looking up the account
    /// table for its role, falling back to the raw identity string.
    pub fn display_name(&self, identity: &str, role: Role) -> Result<String, CoreError> {
        let resolved = match role {
            Role::Parent => self
                .parents()?
                .into_iter()
                .find(|p| {
                    p.email.eq_ignore_ascii_case(identity) || p.name.eq_ignore_ascii_case(identity)
                })
                .map(|p| p.name),
            Role::Teacher => self
                .teachers()?
                .into_iter()
                .find(|t| {
                    t.email.eq_ignore_ascii_case(identity) || t.name.eq_ignore_ascii_case(identity)
                })
                .map(|t| t.name),
            Role::Student => self
                .students()?
                .into_iter()
                .find(|s| {
                    s.name.eq_ignore_ascii_case(identity)
                        || s.student_code.eq_ignore_ascii_case(identity)
                })
                .map(|s| s.name),
        };
        Ok(resolved.unwrap_or_else(|| identity.to_string()))
    }

    // -- Demo seeding --

    /// Seed the showcase accounts so the app works without signup. Idempotent:
    /// existing accounts are left alone.
    pub fn seed_demo_accounts(&self) -> Result<(), CoreError> {
        if self
            .teachers()?
            .iter()
            .all(|t| !t.email.eq_ignore_ascii_case("habiba@sprout.school"))
        {
            self.register_teacher("Habiba", "habiba@sprout.school", "sprout-demo")?;
        }

        if self
            .students()?
            .iter()
            .all(|s| !s.student_code.eq_ignore_ascii_case("OMAR01"))
        {
            self.register_student("Omar", "OMAR01", Some("hazem@family.net"))?;
        }

        if self
            .parents()?
            .iter()
            .all(|p| !p.email.eq_ignore_ascii_case("hazem@family.net"))
        {
            self.register_parent("Hazem", "hazem@family.net", "sprout-demo", "OMAR01")?;
        }

        info!("demo accounts seeded");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), CoreError> {
    let parsed = PasswordHash::new(hash).map_err(|e| CoreError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| CoreError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Accounts {
        Accounts::new(Arc::new(Store::open_in_memory().unwrap()))
    }

    #[test]
    fn register_then_login_roundtrip() {
        let accounts = accounts();
        accounts
            .register_parent("Dina", "dina@x.com", "hunter22", "KID01")
            .unwrap();

        let snapshot = accounts.login_parent("DINA@X.COM", "hunter22").unwrap();
        assert_eq!(snapshot.name, "Dina");
        assert_eq!(snapshot.role, Role::Parent);

        // Login persists the session snapshot.
        let current = accounts.current(Role::Parent).unwrap().unwrap();
        assert_eq!(current.account_id, snapshot.account_id);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let accounts = accounts();
        accounts
            .register_teacher("Ms. Reem", "reem@x.com", "correct-horse")
            .unwrap();

        assert!(matches!(
            accounts.login_teacher("reem@x.com", "wrong"),
            Err(CoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn stored_password_is_hashed() {
        let accounts = accounts();
        let account = accounts
            .register_parent("Dina", "dina@x.com", "hunter22", "KID01")
            .unwrap();
        assert_ne!(account.password_hash, "hunter22");
        assert!(account.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let accounts = accounts();
        accounts
            .register_parent("Dina", "dina@x.com", "pw-one-here", "KID01")
            .unwrap();

        assert!(matches!(
            accounts.register_parent("Other", "DINA@x.com", "pw-two-here", "KID02"),
            Err(CoreError::DuplicateAccount(_))
        ));
    }

    #[test]
    fn logout_clears_session() {
        let accounts = accounts();
        accounts
            .register_parent("Dina", "dina@x.com", "hunter22", "KID01")
            .unwrap();
        accounts.login_parent("dina@x.com", "hunter22").unwrap();

        accounts.logout(Role::Parent).unwrap();
        assert!(accounts.current(Role::Parent).unwrap().is_none());
    }

    #[test]
    fn student_logs_in_by_code() {
        let accounts = accounts();
        accounts.register_student("Omar", "OMAR01", None).unwrap();

        let snapshot = accounts.login_student("omar01").unwrap();
        assert_eq!(snapshot.identity, "Omar");
        assert_eq!(snapshot.role, Role::Student);
    }

    #[test]
    fn display_name_resolves_or_falls_back() {
        let accounts = accounts();
        accounts
            .register_teacher("Ms. Reem", "reem@x.com", "correct-horse")
            .unwrap();

        assert_eq!(
            accounts.display_name("reem@x.com", Role::Teacher).unwrap(),
            "Ms. Reem"
        );
        // No matching record: the raw identity comes back unchanged.
        assert_eq!(
            accounts.display_name("ghost@x.com", Role::Teacher).unwrap(),
            "ghost@x.com"
        );
    }

    #[test]
    fn demo_seeding_is_idempotent() {
        let accounts = accounts();
        accounts.seed_demo_accounts().unwrap();
        accounts.seed_demo_accounts().unwrap();

        assert_eq!(accounts.teachers().unwrap().len(), 1);
        assert_eq!(accounts.parents().unwrap().len(), 1);
        assert_eq!(accounts.students().unwrap().len(), 1);
    }
}
