use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::journey::clock::FixedClock;
use crate::workflows::journey::domain::{
    ApplicantId, ApplicantProfile, BudgetRange, DerivedDocument, DerivedTask, DocumentKind,
    ExamStatus, FundingPlan, JourneyStage, NewDocument, NewShortlistEntry, NewTask, OnboardingSubmission,
    ShortlistEntry, ShortlistId, TaskId, TuitionRange, University, UniversityId,
    UniversityRequirements,
};
use crate::workflows::journey::memory::{InMemoryCatalog, InMemoryJourneyStore};
use crate::workflows::journey::repository::{JourneyStore, RepositoryError};
use crate::workflows::journey::JourneyService;

pub(super) const HARBOR: UniversityId = UniversityId(1);
pub(super) const LAKESIDE: UniversityId = UniversityId(2);
pub(super) const NORTHFIELD: UniversityId = UniversityId(3);

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn applicant(name: &str) -> ApplicantId {
    ApplicantId(name.to_string())
}

pub(super) fn university(
    id: UniversityId,
    name: &str,
    country: &str,
    acceptance_rate: Option<f64>,
    min_gpa: Option<f64>,
    min_test_score: Option<f64>,
    tuition: (f64, f64),
) -> University {
    University {
        id,
        name: name.to_string(),
        country: country.to_string(),
        city: None,
        ranking: Some(id.0 as u32 * 10),
        acceptance_rate,
        tuition: TuitionRange {
            min: tuition.0,
            max: tuition.1,
        },
        requirements: UniversityRequirements {
            min_gpa,
            min_test_score,
            min_language_score: Some(6.5),
        },
        fields_offered: vec!["Computer Science".to_string(), "Engineering".to_string()],
        programs: vec!["MS in CS".to_string()],
        description: format!("{name} test fixture"),
        website_url: None,
    }
}

pub(super) fn universities() -> Vec<University> {
    vec![
        university(
            HARBOR,
            "Harbor Institute",
            "USA",
            Some(7.0),
            Some(3.5),
            Some(320.0),
            (50_000.0, 54_000.0),
        ),
        university(
            LAKESIDE,
            "Lakeside University",
            "Canada",
            Some(45.0),
            Some(3.0),
            Some(305.0),
            (20_000.0, 26_000.0),
        ),
        university(
            NORTHFIELD,
            "Northfield College",
            "UK",
            Some(20.0),
            Some(3.2),
            Some(310.0),
            (30_000.0, 34_000.0),
        ),
    ]
}

pub(super) fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(universities())
}

pub(super) fn submission() -> OnboardingSubmission {
    OnboardingSubmission {
        education_level: "Bachelor's".to_string(),
        major: "Computer Engineering".to_string(),
        graduation_year: 2025,
        gpa: Some(3.6),
        degree: "Master's".to_string(),
        field_of_study: "Computer Science".to_string(),
        target_intake_year: 2027,
        preferred_countries: vec!["USA".to_string(), "Canada".to_string()],
        budget_min: 25_000.0,
        budget_max: 55_000.0,
        funding_plan: FundingPlan::ScholarshipDependent,
        english_test: ExamStatus::Completed,
        english_score: Some(7.5),
        graduate_test: ExamStatus::Completed,
        graduate_score: Some(318.0),
        sop: ExamStatus::InProgress,
    }
}

/// Profile used by the pure scorer and classifier tests.
pub(super) fn profile(gpa: Option<f64>, graduate_score: Option<f64>) -> ApplicantProfile {
    let mut profile = ApplicantProfile::new(applicant("pure"), now());
    profile.academics.gpa = gpa;
    profile.exams.graduate_score = graduate_score;
    profile.goals.field_of_study = Some("Computer Science".to_string());
    profile.budget = Some(BudgetRange {
        min: 25_000.0,
        max: 55_000.0,
    });
    profile
}

pub(super) type MemoryService = JourneyService<InMemoryJourneyStore, InMemoryCatalog>;

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryJourneyStore>, Arc<FixedClock>) {
    let store = Arc::new(InMemoryJourneyStore::new());
    let clock = Arc::new(FixedClock::new(now()));
    let service = JourneyService::new(store.clone(), Arc::new(catalog()), clock.clone());
    (service, store, clock)
}

/// Service with `applicant("ada")` already onboarded.
pub(super) fn onboarded_service() -> (MemoryService, Arc<InMemoryJourneyStore>, Arc<FixedClock>) {
    let (service, store, clock) = build_service();
    service
        .complete_onboarding(&applicant("ada"), submission())
        .expect("onboarding succeeds");
    (service, store, clock)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Delegates to the in-memory store, optionally rejecting task inserts whose title
/// contains `failing_fragment`, hiding existing rows from the idempotence lookups, or
/// running `interleaved_edit` right after every shortlist write.
#[derive(Default, Clone)]
pub(super) struct FlakyStore {
    pub(super) inner: InMemoryJourneyStore,
    pub(super) failing_fragment: Option<String>,
    pub(super) blind_lookups: bool,
    pub(super) interleaved_edit: Option<fn(&InMemoryJourneyStore)>,
}

impl FlakyStore {
    pub(super) fn failing_on(fragment: &str) -> Self {
        Self {
            failing_fragment: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    pub(super) fn blind() -> Self {
        Self {
            blind_lookups: true,
            ..Self::default()
        }
    }

    pub(super) fn interleaving(edit: fn(&InMemoryJourneyStore)) -> Self {
        Self {
            interleaved_edit: Some(edit),
            ..Self::default()
        }
    }

    fn run_interleaved_edit(&self) {
        if let Some(edit) = self.interleaved_edit {
            edit(&self.inner);
        }
    }
}

impl JourneyStore for FlakyStore {
    fn fetch_profile(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<ApplicantProfile>, RepositoryError> {
        self.inner.fetch_profile(applicant)
    }

    fn save_profile(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        self.inner.save_profile(profile)
    }

    fn set_stage(
        &self,
        applicant: &ApplicantId,
        stage: JourneyStage,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError> {
        self.inner.set_stage(applicant, stage, updated_at)
    }

    fn insert_shortlist(
        &self,
        entry: NewShortlistEntry,
    ) -> Result<ShortlistEntry, RepositoryError> {
        let stored = self.inner.insert_shortlist(entry)?;
        self.run_interleaved_edit();
        Ok(stored)
    }

    fn update_shortlist(&self, entry: ShortlistEntry) -> Result<(), RepositoryError> {
        self.inner.update_shortlist(entry)?;
        self.run_interleaved_edit();
        Ok(())
    }

    fn fetch_shortlist(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<Option<ShortlistEntry>, RepositoryError> {
        self.inner.fetch_shortlist(applicant, university)
    }

    fn shortlist_for(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ShortlistEntry>, RepositoryError> {
        self.inner.shortlist_for(applicant)
    }

    fn delete_shortlist(&self, id: ShortlistId) -> Result<(), RepositoryError> {
        self.inner.delete_shortlist(id)
    }

    fn insert_task(&self, task: NewTask) -> Result<DerivedTask, RepositoryError> {
        if let Some(fragment) = &self.failing_fragment {
            if task.title.contains(fragment.as_str()) {
                return Err(RepositoryError::Unavailable("disk full".to_string()));
            }
        }
        self.inner.insert_task(task)
    }

    fn update_task(&self, task: DerivedTask) -> Result<(), RepositoryError> {
        self.inner.update_task(task)
    }

    fn fetch_task(&self, id: TaskId) -> Result<Option<DerivedTask>, RepositoryError> {
        self.inner.fetch_task(id)
    }

    fn find_open_task(
        &self,
        applicant: &ApplicantId,
        title: &str,
    ) -> Result<Option<DerivedTask>, RepositoryError> {
        if self.blind_lookups {
            return Ok(None);
        }
        self.inner.find_open_task(applicant, title)
    }

    fn tasks_for(&self, applicant: &ApplicantId) -> Result<Vec<DerivedTask>, RepositoryError> {
        self.inner.tasks_for(applicant)
    }

    fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError> {
        self.inner.delete_task(id)
    }

    fn delete_tasks_for_university(
        &self,
        applicant: &ApplicantId,
        university: UniversityId,
    ) -> Result<usize, RepositoryError> {
        self.inner.delete_tasks_for_university(applicant, university)
    }

    fn insert_document(&self, document: NewDocument) -> Result<DerivedDocument, RepositoryError> {
        self.inner.insert_document(document)
    }

    fn find_document(
        &self,
        shortlist: ShortlistId,
        kind: DocumentKind,
    ) -> Result<Option<DerivedDocument>, RepositoryError> {
        if self.blind_lookups {
            return Ok(None);
        }
        self.inner.find_document(shortlist, kind)
    }

    fn documents_for(
        &self,
        shortlist: ShortlistId,
    ) -> Result<Vec<DerivedDocument>, RepositoryError> {
        self.inner.documents_for(shortlist)
    }

    fn delete_documents_for(&self, shortlist: ShortlistId) -> Result<usize, RepositoryError> {
        self.inner.delete_documents_for(shortlist)
    }
}

/// Every call fails as if the database were offline.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl JourneyStore for UnavailableStore {
    fn fetch_profile(&self, _: &ApplicantId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        offline()
    }

    fn save_profile(&self, _: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        offline()
    }

    fn set_stage(
        &self,
        _: &ApplicantId,
        _: JourneyStage,
        _: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError> {
        offline()
    }

    fn insert_shortlist(&self, _: NewShortlistEntry) -> Result<ShortlistEntry, RepositoryError> {
        offline()
    }

    fn update_shortlist(&self, _: ShortlistEntry) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_shortlist(
        &self,
        _: &ApplicantId,
        _: UniversityId,
    ) -> Result<Option<ShortlistEntry>, RepositoryError> {
        offline()
    }

    fn shortlist_for(&self, _: &ApplicantId) -> Result<Vec<ShortlistEntry>, RepositoryError> {
        offline()
    }

    fn delete_shortlist(&self, _: ShortlistId) -> Result<(), RepositoryError> {
        offline()
    }

    fn insert_task(&self, _: NewTask) -> Result<DerivedTask, RepositoryError> {
        offline()
    }

    fn update_task(&self, _: DerivedTask) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_task(&self, _: TaskId) -> Result<Option<DerivedTask>, RepositoryError> {
        offline()
    }

    fn find_open_task(
        &self,
        _: &ApplicantId,
        _: &str,
    ) -> Result<Option<DerivedTask>, RepositoryError> {
        offline()
    }

    fn tasks_for(&self, _: &ApplicantId) -> Result<Vec<DerivedTask>, RepositoryError> {
        offline()
    }

    fn delete_task(&self, _: TaskId) -> Result<(), RepositoryError> {
        offline()
    }

    fn delete_tasks_for_university(
        &self,
        _: &ApplicantId,
        _: UniversityId,
    ) -> Result<usize, RepositoryError> {
        offline()
    }

    fn insert_document(&self, _: NewDocument) -> Result<DerivedDocument, RepositoryError> {
        offline()
    }

    fn find_document(
        &self,
        _: ShortlistId,
        _: DocumentKind,
    ) -> Result<Option<DerivedDocument>, RepositoryError> {
        offline()
    }

    fn documents_for(&self, _: ShortlistId) -> Result<Vec<DerivedDocument>, RepositoryError> {
        offline()
    }

    fn delete_documents_for(&self, _: ShortlistId) -> Result<usize, RepositoryError> {
        offline()
    }
}
