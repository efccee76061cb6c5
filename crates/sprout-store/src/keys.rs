//! Key layout of the persisted state. These names are the external
//! interface of the store and must stay stable across versions.

use std::fmt::Display;

/// JSON array of every cross-role message, newest first.
pub const GLOBAL_MESSAGES: &str = "globalMessages";

pub const PARENT_ACCOUNTS: &str = "parentAccounts";
pub const TEACHER_ACCOUNTS: &str = "teacherAccounts";
pub const STUDENT_ACCOUNTS: &str = "studentAccounts";

/// Active-session snapshots.
pub const CURRENT_PARENT: &str = "currentParent";
pub const CURRENT_TEACHER: &str = "currentTeacher";

/// Per-student progress blob.
pub fn student_data(id: impl Display) -> String {
    format!("studentData_{id}")
}

/// Cached dashboard view for a parent session.
pub fn parent_data(id: impl Display) -> String {
    format!("parentData_{id}")
}

/// Cached dashboard view for a teacher session.
pub fn teacher_data(id: impl Display) -> String {
    format!("teacherData_{id}")
}
