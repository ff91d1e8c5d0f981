//! Mutex-guarded implementations of [`JourneyStore`] and [`UniversityCatalog`].
//!
//! Uniqueness rules are checked and applied under the same lock, so concurrent lock
//! requests against this store can never produce duplicate rows.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicantId, ApplicantProfile, DerivedDocument, DerivedTask, DocumentId, DocumentKind,
    JourneyStage, NewDocument, NewShortlistEntry, NewTask, ShortlistEntry, ShortlistId, TaskId,
    University, UniversityId,
};
use super::repository::{JourneyStore, RepositoryError, UniversityCatalog};

fn acquire<'a, T>(
    mutex: &'a Mutex<T>,
    collection: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{collection} mutex poisoned")))
}

#[derive(Debug)]
struct Sequence(AtomicU64);

impl Default for Sequence {
    fn default() -> Self {
        Self(AtomicU64::new(1))
    }
}

impl Sequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryJourneyStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    profiles: Mutex<HashMap<ApplicantId, ApplicantProfile>>,
    shortlist: Mutex<BTreeMap<ShortlistId, ShortlistEntry>>,
    tasks: Mutex<BTreeMap<TaskId, DerivedTask>>,
    documents: Mutex<BTreeMap<DocumentId, DerivedDocument>>,
    shortlist_ids: Sequence,
    task_ids: Sequence,
    document_ids: Sequence,
}

impl InMemoryJourneyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document held for `applicant`, across shortlist entries.
    #[cfg(test)]
    pub(crate) fn documents_of(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<DerivedDocument>, RepositoryError> {
        let guard = acquire(&self.inner.documents, "documents")?;
        Ok(guard
            .values()
            .filter(|document| &document.applicant_id == applicant)
            .cloned()
            .collect())
    }
}

impl JourneyStore for InMemoryJourneyStore {
    fn fetch_profile(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<ApplicantProfile>, RepositoryError> {
        let guard = acquire(&self.inner.profiles, "profiles")?;
        Ok(guard.get(applicant).cloned())
    }

    fn save_profile(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        let mut guard = acquire(&self.inner.profiles, "profiles")?;
        guard.insert(profile.applicant_id.clone(), profile.clone());
        Ok(profile)
    }

    fn set_stage(
        &self,
        applicant: &ApplicantId,
        stage: JourneyStage,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError> {
        let mut guard = acquire(&self.inner.profiles, "profiles")?;
        let profile = guard.get_mut(applicant).ok_or(RepositoryError::NotFound)?;
        profile.stage = stage;
        profile.updated_at = updated_at;
        Ok(profile.clone())
    }

    fn insert_shortlist(
        &self,
        entry: NewShortlistEntry,
    ) -> Result<ShortlistEntry, RepositoryError> {
        let mut guard = acquire(&self.inner.shortlist, "shortlist")?;
        let duplicate = guard.values().any(|existing| {
            existing.applicant_id == entry.applicant_id
                && existing.university_id == entry.university_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let stored = ShortlistEntry {
            id: ShortlistId(self.inner.shortlist_ids.next()),
            applicant_id: entry.applicant_id,
            university_id: entry.university_id,
            category: entry.category,
            locked: false,
            locked_at: None,
            advisory: entry.advisory,
            created_at: entry.created_at,
        };
        guard.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_shortlist(&self, entry: ShortlistEntry) -> Result<(), RepositoryError> {
        let mut guard = acquire(&self.inner.shortlist, "shortlist")?;
        match guard.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_shortlist(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<Option<ShortlistEntry>, RepositoryError> {
        let guard = acquire(&self.inner.shortlist, "shortlist")?;
        Ok(guard
            .values()
            .find(|entry| &entry.applicant_id == applicant && entry.university_id == university)
            .cloned())
    }

    fn shortlist_for(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ShortlistEntry>, RepositoryError> {
        let guard = acquire(&self.inner.shortlist, "shortlist")?;
        Ok(guard
            .values()
            .filter(|entry| &entry.applicant_id == applicant)
            .cloned()
            .collect())
    }

    fn delete_shortlist(&self, id: ShortlistId) -> Result<(), RepositoryError> {
        let mut guard = acquire(&self.inner.shortlist, "shortlist")?;
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn insert_task(&self, task: NewTask) -> Result<DerivedTask, RepositoryError> {
        let mut guard = acquire(&self.inner.tasks, "tasks")?;
        let duplicate = guard.values().any(|existing| {
            !existing.completed
                && existing.applicant_id == task.applicant_id
                && existing.title == task.title
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let stored = DerivedTask {
            id: TaskId(self.inner.task_ids.next()),
            applicant_id: task.applicant_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            category: task.category,
            completed: false,
            completed_at: None,
            due_date: task.due_date,
            system_generated: task.system_generated,
            university_id: task.university_id,
            created_at: task.created_at,
        };
        guard.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_task(&self, task: DerivedTask) -> Result<(), RepositoryError> {
        let mut guard = acquire(&self.inner.tasks, "tasks")?;
        if !task.completed {
            let clash = guard.values().any(|existing| {
                existing.id != task.id
                    && !existing.completed
                    && existing.applicant_id == task.applicant_id
                    && existing.title == task.title
            });
            if clash {
                return Err(RepositoryError::Conflict);
            }
        }

        match guard.get_mut(&task.id) {
            Some(slot) => {
                *slot = task;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_task(&self, id: TaskId) -> Result<Option<DerivedTask>, RepositoryError> {
        let guard = acquire(&self.inner.tasks, "tasks")?;
        Ok(guard.get(&id).cloned())
    }

    fn find_open_task(
        &self,
        applicant: &ApplicantId,
        title: &str,
    ) -> Result<Option<DerivedTask>, RepositoryError> {
        let guard = acquire(&self.inner.tasks, "tasks")?;
        Ok(guard
            .values()
            .find(|task| !task.completed && &task.applicant_id == applicant && task.title == title)
            .cloned())
    }

    fn tasks_for(&self, applicant: &ApplicantId) -> Result<Vec<DerivedTask>, RepositoryError> {
        let guard = acquire(&self.inner.tasks, "tasks")?;
        Ok(guard
            .values()
            .filter(|task| &task.applicant_id == applicant)
            .cloned()
            .collect())
    }

    fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError> {
        let mut guard = acquire(&self.inner.tasks, "tasks")?;
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_tasks_for_university(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<usize, RepositoryError> {
        let mut guard = acquire(&self.inner.tasks, "tasks")?;
        let before = guard.len();
        guard.retain(|_, task| {
            !(&task.applicant_id == applicant && task.university_id == Some(university))
        });
        Ok(before - guard.len())
    }

    fn insert_document(&self, document: NewDocument) -> Result<DerivedDocument, RepositoryError> {
        let mut guard = acquire(&self.inner.documents, "documents")?;
        let duplicate = guard.values().any(|existing| {
            existing.shortlist_id == document.shortlist_id && existing.kind == document.kind
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let stored = DerivedDocument {
            id: DocumentId(self.inner.document_ids.next()),
            applicant_id: document.applicant_id,
            shortlist_id: document.shortlist_id,
            kind: document.kind,
            status: document.status,
            due_date: document.due_date,
            created_at: document.created_at,
        };
        guard.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_document(
        &self,
        shortlist: ShortlistId,
        kind: DocumentKind,
    ) -> Result<Option<DerivedDocument>, RepositoryError> {
        let guard = acquire(&self.inner.documents, "documents")?;
        Ok(guard
            .values()
            .find(|document| document.shortlist_id == shortlist && document.kind == kind)
            .cloned())
    }

    fn documents_for(
        &self,
        shortlist: ShortlistId,
    ) -> Result<Vec<DerivedDocument>, RepositoryError> {
        let guard = acquire(&self.inner.documents, "documents")?;
        Ok(guard
            .values()
            .filter(|document| document.shortlist_id == shortlist)
            .cloned()
            .collect())
    }

    fn delete_documents_for(&self, shortlist: ShortlistId) -> Result<usize, RepositoryError> {
        let mut guard = acquire(&self.inner.documents, "documents")?;
        let before = guard.len();
        guard.retain(|_, document| document.shortlist_id != shortlist);
        Ok(before - guard.len())
    }
}

/// Catalogue held in memory, ordered by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    universities: Arc<BTreeMap<UniversityId, University>>,
}

impl InMemoryCatalog {
    pub fn new(universities: impl IntoIterator<Item = University>) -> Self {
        let universities = universities
            .into_iter()
            .map(|university| (university.id, university))
            .collect();
        Self {
            universities: Arc::new(universities),
        }
    }

    pub fn len(&self) -> usize {
        self.universities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
    }
}

impl UniversityCatalog for InMemoryCatalog {
    fn fetch(&self, id: UniversityId) -> Result<Option<University>, RepositoryError> {
        Ok(self.universities.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<University>, RepositoryError> {
        Ok(self.universities.values().cloned().collect())
    }
}
