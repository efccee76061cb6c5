//! Per-student progress blobs: XP, completed lessons, badges.
//!
//! What earns XP or unlocks a badge is the caller's decision; this layer
//! only persists the results.

use std::sync::Arc;

use chrono::Utc;
use sprout_store::{Store, keys};
use sprout_types::StudentProgress;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Clone)]
pub struct ProgressRepo {
    store: Arc<Store>,
}

impl ProgressRepo {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// A student with no stored blob starts from zero.
    pub fn load(&self, student_id: Uuid) -> Result<StudentProgress, CoreError> {
        Ok(self
            .store
            .get(&keys::student_data(student_id))?
            .unwrap_or_default())
    }

    pub fn add_xp(&self, student_id: Uuid, amount: u32) -> Result<StudentProgress, CoreError> {
        self.update(student_id, |p| p.xp = p.xp.saturating_add(amount))
    }

    /// Set-like: completing the same lesson twice records it once.
    pub fn complete_lesson(
        &self,
        student_id: Uuid,
        lesson: &str,
    ) -> Result<StudentProgress, CoreError> {
        self.update(student_id, |p| {
            if !p.completed_lessons.iter().any(|l| l == lesson) {
                p.completed_lessons.push(lesson.to_string());
            }
        })
    }

    /// Set-like: a badge is awarded at most once.
    pub fn award_badge(&self, student_id: Uuid, badge: &str) -> Result<StudentProgress, CoreError> {
        self.update(student_id, |p| {
            if !p.badges.iter().any(|b| b == badge) {
                p.badges.push(badge.to_string());
            }
        })
    }

    fn update<F>(&self, student_id: Uuid, mutate: F) -> Result<StudentProgress, CoreError>
    where
        F: FnOnce(&mut StudentProgress),
    {
        let mut progress = self.load(student_id)?;
        mutate(&mut progress);
        progress.updated_at = Some(Utc::now());
        self.store.set(&keys::student_data(student_id), &progress)?;
        Ok(progress)
    }
}
