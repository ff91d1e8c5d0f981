use chrono::{DateTime, Utc};

use super::domain::{
    ApplicantId, ApplicantProfile, DerivedDocument, DerivedTask, DocumentKind, JourneyStage,
    NewDocument, NewShortlistEntry, NewTask, ShortlistEntry, ShortlistId, TaskId, University,
    UniversityId,
};

/// Storage abstraction so the journey service can be exercised in isolation.
///
/// Implementations enforce three uniqueness rules and report violations as
/// [`RepositoryError::Conflict`]:
/// - one shortlist entry per (applicant, university)
/// - one open task per (applicant, title)
/// - one document per (shortlist entry, kind)
pub trait JourneyStore: Send + Sync {
    fn fetch_profile(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<ApplicantProfile>, RepositoryError>;
    /// Insert or replace the applicant's profile.
    fn save_profile(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError>;
    /// Overwrite only the stage of a stored profile and return the stored record.
    fn set_stage(
        &self,
        applicant: &ApplicantId,
        stage: JourneyStage,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError>;

    fn insert_shortlist(&self, entry: NewShortlistEntry)
        -> Result<ShortlistEntry, RepositoryError>;
    fn update_shortlist(&self, entry: ShortlistEntry) -> Result<(), RepositoryError>;
    fn fetch_shortlist(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<Option<ShortlistEntry>, RepositoryError>;
    fn shortlist_for(&self, applicant: &ApplicantId)
        -> Result<Vec<ShortlistEntry>, RepositoryError>;
    fn delete_shortlist(&self, id: ShortlistId) -> Result<(), RepositoryError>;

    fn insert_task(&self, task: NewTask) -> Result<DerivedTask, RepositoryError>;
    fn update_task(&self, task: DerivedTask) -> Result<(), RepositoryError>;
    fn fetch_task(&self, id: TaskId) -> Result<Option<DerivedTask>, RepositoryError>;
    fn find_open_task(
        &self,
        applicant: &ApplicantId,
        title: &str,
    ) -> Result<Option<DerivedTask>, RepositoryError>;
    fn tasks_for(&self, applicant: &ApplicantId) -> Result<Vec<DerivedTask>, RepositoryError>;
    fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError>;
    /// Remove every task generated for `university`; returns how many were removed.
    fn delete_tasks_for_university(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<usize, RepositoryError>;

    fn insert_document(&self, document: NewDocument) -> Result<DerivedDocument, RepositoryError>;
    fn find_document(
        &self,
        shortlist: ShortlistId,
        kind: DocumentKind,
    ) -> Result<Option<DerivedDocument>, RepositoryError>;
    fn documents_for(&self, shortlist: ShortlistId)
        -> Result<Vec<DerivedDocument>, RepositoryError>;
    fn delete_documents_for(&self, shortlist: ShortlistId) -> Result<usize, RepositoryError>;
}

/// Read-only view of the university catalogue maintained by the import collaborator.
pub trait UniversityCatalog: Send + Sync {
    fn fetch(&self, id: UniversityId) -> Result<Option<University>, RepositoryError>;
    fn all(&self) -> Result<Vec<University>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
