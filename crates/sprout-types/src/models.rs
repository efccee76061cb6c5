use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message visibility is partitioned by role: the same identity string used
/// as a parent and as a teacher addresses two disjoint mailboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Parent,
    Teacher,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Parent => "Parent",
            Role::Teacher => "Teacher",
        }
    }
}

/// A single cross-role message. Stored under the `globalMessages` key as a
/// JSON array, newest first.
///
/// Everything except `is_read` and `replies` is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    #[serde(rename = "fromType")]
    pub from_role: Role,
    pub to: String,
    #[serde(rename = "toType")]
    pub to_role: Role,
    pub subject: String,
    #[serde(rename = "message")]
    pub body: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    pub replies: Vec<Reply>,
}

impl Message {
    /// Visibility predicate: the message belongs to `(identity, role)` if that
    /// pair matches either endpoint. Identity comparison is case-insensitive.
    pub fn visible_to(&self, identity: &str, role: Role) -> bool {
        (self.to_role == role && self.to.eq_ignore_ascii_case(identity))
            || (self.from_role == role && self.from.eq_ignore_ascii_case(identity))
    }
}

/// Append-only reply on a message. Insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub from: String,
    #[serde(rename = "fromType")]
    pub from_role: Role,
    #[serde(rename = "message")]
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

// -- Accounts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Links the parent to their child's `StudentAccount::student_code`.
    pub child_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Students log in by code; they carry no password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAccount {
    pub id: Uuid,
    pub name: String,
    pub student_code: String,
    pub parent_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Active-session record persisted under `currentParent` / `currentTeacher`.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub account_id: Uuid,
    pub name: String,
    pub identity: String,
    pub role: Role,
    pub logged_in_at: DateTime<Utc>,
}

// -- Progress --

/// Per-student progress blob stored under `studentData_<id>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub xp: u32,
    pub completed_lessons: Vec<String>,
    pub badges: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
