//! Derived tasks and document placeholders.
//!
//! Generation is best-effort per item. An existing open task with the same title, or an
//! existing document of the same kind on the shortlist entry, is skipped; so is an
//! insert the store rejects with `Conflict`. Any other store failure is logged and
//! counted, and the remaining items are still attempted.

use super::blueprint::ApplicationBlueprint;
use super::domain::{
    ApplicantId, ApplicantProfile, NewDocument, NewTask, ShortlistEntry, University,
};
use super::repository::{JourneyStore, RepositoryError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// Per-batch counters returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl GenerationReport {
    pub fn attempted(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

pub struct DerivedWorkGenerator {
    blueprint: ApplicationBlueprint,
}

impl Default for DerivedWorkGenerator {
    fn default() -> Self {
        Self::new(ApplicationBlueprint::standard())
    }
}

impl DerivedWorkGenerator {
    pub fn new(blueprint: ApplicationBlueprint) -> Self {
        Self { blueprint }
    }

    pub fn blueprint(&self) -> &ApplicationBlueprint {
        &self.blueprint
    }

    /// Create the per-university application tasks for a lock made at `now`.
    pub fn generate_tasks<S>(
        &self,
        store: &S,
        applicant: &ApplicantId,
        university: &University,
        profile: &ApplicantProfile,
        now: DateTime<Utc>,
    ) -> GenerationReport
    where
        S: JourneyStore + ?Sized,
    {
        let mut report = GenerationReport::default();

        for template in self.blueprint.lock_tasks() {
            let task = NewTask {
                applicant_id: applicant.clone(),
                title: template.title_for(&university.name),
                description: template.description_for(&university.name),
                priority: template.priority.resolve(profile),
                category: template.category,
                due_date: template.due.resolve(now),
                system_generated: true,
                university_id: Some(university.id),
                created_at: now,
            };
            insert_task_once(store, template.key, task, &mut report);
        }

        debug!(
            applicant = %applicant,
            university = %university.id,
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "application tasks generated"
        );
        report
    }

    /// Create the document placeholders for a locked shortlist entry.
    pub fn generate_documents<S>(
        &self,
        store: &S,
        applicant: &ApplicantId,
        entry: &ShortlistEntry,
        now: DateTime<Utc>,
    ) -> GenerationReport
    where
        S: JourneyStore + ?Sized,
    {
        let mut report = GenerationReport::default();

        for template in self.blueprint.documents() {
            match store.find_document(entry.id, template.kind) {
                Ok(Some(_)) => {
                    report.skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, kind = ?template.kind, "document lookup failed");
                    report.failed += 1;
                    continue;
                }
            }

            let document = NewDocument {
                applicant_id: applicant.clone(),
                shortlist_id: entry.id,
                kind: template.kind,
                status: template.initial_status,
                due_date: template.due.resolve(now),
                created_at: now,
            };

            match store.insert_document(document) {
                Ok(_) => report.created += 1,
                Err(RepositoryError::Conflict) => report.skipped += 1,
                Err(err) => {
                    warn!(error = %err, kind = ?template.kind, "document insert failed");
                    report.failed += 1;
                }
            }
        }

        debug!(
            applicant = %applicant,
            university = %entry.university_id,
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "application documents generated"
        );
        report
    }

    /// Create the readiness tasks suggested right after onboarding.
    pub fn generate_starter_tasks<S>(
        &self,
        store: &S,
        profile: &ApplicantProfile,
        now: DateTime<Utc>,
    ) -> GenerationReport
    where
        S: JourneyStore + ?Sized,
    {
        let mut report = GenerationReport::default();

        for template in self
            .blueprint
            .starter_tasks()
            .iter()
            .filter(|template| template.trigger.applies(profile))
        {
            let task = NewTask {
                applicant_id: profile.applicant_id.clone(),
                title: template.title.to_string(),
                description: template.description_for(profile),
                priority: template.priority,
                category: template.category,
                due_date: None,
                system_generated: true,
                university_id: None,
                created_at: now,
            };
            insert_task_once(store, template.key, task, &mut report);
        }

        report
    }
}

fn insert_task_once<S>(store: &S, key: &str, task: NewTask, report: &mut GenerationReport)
where
    S: JourneyStore + ?Sized,
{
    match store.find_open_task(&task.applicant_id, &task.title) {
        Ok(Some(_)) => {
            report.skipped += 1;
            return;
        }
        Ok(None) => {}
        Err(err) => {
            warn!(error = %err, key, title = %task.title, "task lookup failed");
            report.failed += 1;
            return;
        }
    }

    let title = task.title.clone();
    match store.insert_task(task) {
        Ok(_) => report.created += 1,
        Err(RepositoryError::Conflict) => report.skipped += 1,
        Err(err) => {
            warn!(error = %err, key, title = %title, "task insert failed");
            report.failed += 1;
        }
    }
}
