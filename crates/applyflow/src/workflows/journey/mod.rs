//! Applicant journey engine: profile strength, university fit, stage tracking, and the
//! tasks and documents derived when an applicant commits to a university.
//!
//! [`JourneyService`] is the entry point. It is generic over a [`JourneyStore`] and a
//! [`UniversityCatalog`] so the same rules run against the in-memory store used by the
//! service binary and the failure-injecting doubles used in tests.

pub mod blueprint;
pub mod clock;
pub mod dashboard;
pub mod domain;
pub mod fit;
pub mod generator;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod stage;
pub mod strength;

#[cfg(test)]
mod tests;

pub use blueprint::ApplicationBlueprint;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{CommittedUniversity, JourneyDashboard};
pub use domain::{
    AcademicBackground, ApplicantId, ApplicantProfile, BudgetRange, ChanceBand, CostBand,
    DerivedDocument, DerivedTask, DocumentId, DocumentKind, DocumentStatus, ExamReadiness,
    ExamStatus, FitAdvisory, FundingPlan, JourneyStage, OnboardingSubmission, ProfilePatch,
    ProfileStrength, ReachCategory, ShortlistEntry, ShortlistId, StrengthRating, StudyGoals,
    TaskCategory, TaskDraft, TaskId, TaskPatch, TaskPriority, TuitionRange, University,
    UniversityId, UniversityRequirements,
};
pub use fit::{FitAssessment, FitClassifier, FitConfig, FitError};
pub use generator::{DerivedWorkGenerator, GenerationReport};
pub use memory::{InMemoryCatalog, InMemoryJourneyStore};
pub use repository::{JourneyStore, RepositoryError, UniversityCatalog};
pub use router::{journey_router, APPLICANT_HEADER};
pub use service::{
    JourneyError, JourneyService, LockOutcome, ProfileValidationError, RecommendationFilter,
    Resource, ShortlistRemoval, UniversitySearch, UnlockOutcome,
};
pub use stage::{StageEvent, StageTransition};
