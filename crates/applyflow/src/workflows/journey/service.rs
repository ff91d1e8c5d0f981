use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::blueprint::ApplicationBlueprint;
use super::clock::Clock;
use super::dashboard::{CommittedUniversity, JourneyDashboard};
use super::domain::{
    ApplicantId, ApplicantProfile, BudgetRange, DerivedDocument, DerivedTask, JourneyStage,
    NewShortlistEntry, NewTask, OnboardingSubmission, ProfilePatch, ReachCategory,
    ShortlistEntry, TaskDraft, TaskId, TaskPatch, University, UniversityId,
};
use super::fit::{FitClassifier, FitConfig, FitError};
use super::generator::{DerivedWorkGenerator, GenerationReport};
use super::repository::{JourneyStore, RepositoryError, UniversityCatalog};
use super::stage::{self, StageEvent, StageTransition};
use super::strength;

const MAX_GPA: f64 = 4.0;
const RECOMMENDATION_BUDGET_SLACK: f64 = 1.2;

/// Facade running each applicant action as one unit of work against the store.
pub struct JourneyService<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
    clock: Arc<dyn Clock>,
    classifier: FitClassifier,
    generator: DerivedWorkGenerator,
}

impl<S, C> JourneyService<S, C>
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self::with_components(
            store,
            catalog,
            clock,
            FitConfig::default(),
            ApplicationBlueprint::standard(),
        )
    }

    pub fn with_components(
        store: Arc<S>,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
        config: FitConfig,
        blueprint: ApplicationBlueprint,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            classifier: FitClassifier::new(config),
            generator: DerivedWorkGenerator::new(blueprint),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    #[cfg(test)]
    pub(crate) fn classifier(&self) -> &FitClassifier {
        &self.classifier
    }

    /// Apply the full questionnaire, creating the profile on first contact.
    pub fn complete_onboarding(
        &self,
        applicant: &ApplicantId,
        submission: OnboardingSubmission,
    ) -> Result<ApplicantProfile, JourneyError> {
        let budget = validate_budget(submission.budget_min, submission.budget_max)?;
        validate_gpa(submission.gpa)?;

        let now = self.clock.now();
        let mut profile = self
            .store
            .fetch_profile(applicant)?
            .unwrap_or_else(|| ApplicantProfile::new(applicant.clone(), now));
        let first_time = !profile.onboarding_completed;

        profile.academics.education_level = Some(submission.education_level);
        profile.academics.major = Some(submission.major);
        profile.academics.graduation_year = Some(submission.graduation_year);
        profile.academics.gpa = submission.gpa;
        profile.goals.degree = Some(submission.degree);
        profile.goals.field_of_study = Some(submission.field_of_study);
        profile.goals.target_intake_year = Some(submission.target_intake_year);
        profile.goals.preferred_countries = submission.preferred_countries;
        profile.budget = Some(budget);
        profile.funding_plan = Some(submission.funding_plan);
        profile.exams.english_test = submission.english_test;
        profile.exams.english_score = submission.english_score;
        profile.exams.graduate_test = submission.graduate_test;
        profile.exams.graduate_score = submission.graduate_score;
        profile.exams.sop = submission.sop;
        profile.onboarding_completed = true;
        profile.updated_at = now;

        strength::rescore(&mut profile);
        apply_event(&mut profile, StageEvent::OnboardingCompleted { first_time });

        let stored = self.store.save_profile(profile)?;

        if first_time {
            let report = self
                .generator
                .generate_starter_tasks(self.store.as_ref(), &stored, now);
            info!(
                applicant = %applicant,
                created = report.created,
                skipped = report.skipped,
                failed = report.failed,
                "onboarding completed"
            );
        }

        Ok(stored)
    }

    /// Apply the fields present in `patch` and rescore.
    pub fn update_profile(
        &self,
        applicant: &ApplicantId,
        patch: ProfilePatch,
    ) -> Result<ApplicantProfile, JourneyError> {
        let mut profile = self.require_profile(applicant)?;

        if patch.budget_min.is_some() || patch.budget_max.is_some() {
            let min = patch
                .budget_min
                .or(profile.budget.map(|budget| budget.min))
                .ok_or(ProfileValidationError::MissingBudget)?;
            let max = patch
                .budget_max
                .or(profile.budget.map(|budget| budget.max))
                .ok_or(ProfileValidationError::MissingBudget)?;
            profile.budget = Some(validate_budget(min, max)?);
        }
        if patch.gpa.is_some() {
            validate_gpa(patch.gpa)?;
            profile.academics.gpa = patch.gpa;
        }

        if let Some(value) = patch.education_level {
            profile.academics.education_level = Some(value);
        }
        if let Some(value) = patch.major {
            profile.academics.major = Some(value);
        }
        if let Some(value) = patch.graduation_year {
            profile.academics.graduation_year = Some(value);
        }
        if let Some(value) = patch.degree {
            profile.goals.degree = Some(value);
        }
        if let Some(value) = patch.field_of_study {
            profile.goals.field_of_study = Some(value);
        }
        if let Some(value) = patch.target_intake_year {
            profile.goals.target_intake_year = Some(value);
        }
        if let Some(value) = patch.preferred_countries {
            profile.goals.preferred_countries = value;
        }
        if let Some(value) = patch.funding_plan {
            profile.funding_plan = Some(value);
        }
        if let Some(value) = patch.english_test {
            profile.exams.english_test = value;
        }
        if patch.english_score.is_some() {
            profile.exams.english_score = patch.english_score;
        }
        if let Some(value) = patch.graduate_test {
            profile.exams.graduate_test = value;
        }
        if patch.graduate_score.is_some() {
            profile.exams.graduate_score = patch.graduate_score;
        }
        if let Some(value) = patch.sop {
            profile.exams.sop = value;
        }

        if !profile.onboarding_completed {
            profile.onboarding_completed = true;
            apply_event(
                &mut profile,
                StageEvent::OnboardingCompleted { first_time: true },
            );
        }
        profile.updated_at = self.clock.now();
        strength::rescore(&mut profile);

        Ok(self.store.save_profile(profile)?)
    }

    pub fn profile(&self, applicant: &ApplicantId) -> Result<ApplicantProfile, JourneyError> {
        self.require_profile(applicant)
    }

    /// Catalogue entries matching the applicant's countries, field, and budget headroom.
    pub fn recommendations(
        &self,
        applicant: &ApplicantId,
        filter: &RecommendationFilter,
    ) -> Result<Vec<University>, JourneyError> {
        let profile = self.require_profile(applicant)?;
        if !profile.onboarding_completed {
            return Err(JourneyError::InvalidState(
                "complete onboarding before requesting recommendations".to_string(),
            ));
        }

        let ceiling = profile
            .budget
            .map(|budget| budget.max * RECOMMENDATION_BUDGET_SLACK);
        let preferred = &profile.goals.preferred_countries;

        let universities = self
            .catalog
            .all()?
            .into_iter()
            .filter(|university| {
                preferred.is_empty()
                    || preferred
                        .iter()
                        .any(|country| country.eq_ignore_ascii_case(&university.country))
            })
            .filter(|university| {
                filter
                    .country
                    .as_deref()
                    .map_or(true, |country| country.eq_ignore_ascii_case(&university.country))
            })
            .filter(|university| {
                filter
                    .field
                    .as_deref()
                    .map_or(true, |field| university.offers_field(field))
            })
            .filter(|university| ceiling.map_or(true, |ceiling| university.tuition.min <= ceiling))
            .collect();

        Ok(universities)
    }

    pub fn search_universities(
        &self,
        search: &UniversitySearch,
    ) -> Result<Vec<University>, JourneyError> {
        Ok(self
            .catalog
            .all()?
            .into_iter()
            .filter(|university| search.matches(university))
            .collect())
    }

    /// Shortlist a university, freezing the fit advisory on the new entry.
    pub fn shortlist(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
        category: Option<ReachCategory>,
    ) -> Result<ShortlistEntry, JourneyError> {
        if self
            .store
            .fetch_shortlist(applicant, university_id)?
            .is_some()
        {
            return Err(already_shortlisted(university_id));
        }

        let university = self
            .catalog
            .fetch(university_id)?
            .ok_or(JourneyError::NotFound(Resource::University(university_id)))?;
        let profile = self.store.fetch_profile(applicant)?.ok_or_else(|| {
            JourneyError::InvalidState("create a profile before shortlisting".to_string())
        })?;

        let assessment = self
            .classifier
            .assess(&profile, &university)
            .map_err(|err: FitError| JourneyError::InvalidState(err.to_string()))?;

        let now = self.clock.now();
        let entry = self
            .store
            .insert_shortlist(NewShortlistEntry {
                applicant_id: applicant.clone(),
                university_id,
                category: category.unwrap_or(assessment.category),
                advisory: assessment.advisory(),
                created_at: now,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => already_shortlisted(university_id),
                other => JourneyError::Store(other),
            })?;

        let shortlist_count = self.store.shortlist_for(applicant)?.len();
        self.advance_stage(
            profile,
            StageEvent::ShortlistCreated { shortlist_count },
            now,
        )?;

        debug!(
            applicant = %applicant,
            university = %university_id,
            category = entry.category.label(),
            "university shortlisted"
        );
        Ok(entry)
    }

    pub fn shortlisted(&self, applicant: &ApplicantId) -> Result<Vec<ShortlistEntry>, JourneyError> {
        Ok(self.store.shortlist_for(applicant)?)
    }

    /// Remove an entry together with the tasks and documents its lock produced.
    pub fn remove_shortlist(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
    ) -> Result<ShortlistRemoval, JourneyError> {
        let entry = self.require_entry(applicant, university_id)?;

        let tasks_removed = self
            .store
            .delete_tasks_for_university(applicant, university_id)?;
        let documents_removed = self.store.delete_documents_for(entry.id)?;
        self.store.delete_shortlist(entry.id)?;

        info!(
            applicant = %applicant,
            university = %university_id,
            tasks_removed,
            documents_removed,
            "shortlist entry removed"
        );
        Ok(ShortlistRemoval {
            university_id,
            tasks_removed,
            documents_removed,
        })
    }

    /// Commit to a shortlisted university and generate its application work.
    pub fn lock(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
    ) -> Result<LockOutcome, JourneyError> {
        let mut entry = self.require_entry(applicant, university_id)?;
        let university = self
            .catalog
            .fetch(university_id)?
            .ok_or(JourneyError::NotFound(Resource::University(university_id)))?;
        let profile = self.require_profile(applicant)?;

        let now = self.clock.now();
        entry.lock(now);
        self.store.update_shortlist(entry.clone())?;

        let profile = self.advance_stage(profile, StageEvent::UniversityLocked, now)?;

        let tasks = self.generator.generate_tasks(
            self.store.as_ref(),
            applicant,
            &university,
            &profile,
            now,
        );
        let documents = self
            .generator
            .generate_documents(self.store.as_ref(), applicant, &entry, now);

        info!(
            applicant = %applicant,
            university = %university_id,
            tasks_attempted = tasks.attempted(),
            tasks_created = tasks.created,
            documents_created = documents.created,
            "university locked"
        );
        Ok(LockOutcome {
            entry,
            stage: profile.stage,
            tasks,
            documents,
        })
    }

    /// Release a lock; derived tasks and documents are left in place.
    pub fn unlock(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
    ) -> Result<UnlockOutcome, JourneyError> {
        let mut entry = self.require_entry(applicant, university_id)?;
        entry.unlock();
        self.store.update_shortlist(entry.clone())?;

        let other_locked_remaining = self
            .store
            .shortlist_for(applicant)?
            .iter()
            .any(|other| other.locked && other.id != entry.id);

        let profile = self.require_profile(applicant)?;
        let event = StageEvent::UniversityUnlocked {
            other_locked_remaining,
        };
        let profile = self.advance_stage(profile, event, self.clock.now())?;

        info!(
            applicant = %applicant,
            university = %university_id,
            other_locked_remaining,
            "university unlocked"
        );
        Ok(UnlockOutcome {
            entry,
            stage: profile.stage,
        })
    }

    /// Tasks for the applicant, newest first.
    pub fn tasks(
        &self,
        applicant: &ApplicantId,
        include_completed: bool,
    ) -> Result<Vec<DerivedTask>, JourneyError> {
        let mut tasks: Vec<DerivedTask> = self
            .store
            .tasks_for(applicant)?
            .into_iter()
            .filter(|task| include_completed || !task.completed)
            .collect();
        newest_first(&mut tasks);
        Ok(tasks)
    }

    pub fn create_task(
        &self,
        applicant: &ApplicantId,
        draft: TaskDraft,
    ) -> Result<DerivedTask, JourneyError> {
        let title = task_title(&draft.title)?;

        let task = NewTask {
            applicant_id: applicant.clone(),
            title: title.clone(),
            description: draft.description.unwrap_or_default(),
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            system_generated: false,
            university_id: None,
            created_at: self.clock.now(),
        };

        self.store.insert_task(task).map_err(|err| match err {
            RepositoryError::Conflict => duplicate_task(&title),
            other => JourneyError::Store(other),
        })
    }

    pub fn update_task(
        &self,
        applicant: &ApplicantId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<DerivedTask, JourneyError> {
        let mut task = self.require_task(applicant, task_id)?;

        if let Some(title) = patch.title {
            task.title = task_title(&title)?;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(completed) = patch.completed {
            set_completion(&mut task, completed, self.clock.now());
        }

        self.store
            .update_task(task.clone())
            .map_err(|err| match err {
                RepositoryError::Conflict => duplicate_task(&task.title),
                RepositoryError::NotFound => JourneyError::NotFound(Resource::Task(task_id)),
                other => JourneyError::Store(other),
            })?;
        Ok(task)
    }

    pub fn delete_task(&self, applicant: &ApplicantId, task_id: TaskId) -> Result<(), JourneyError> {
        self.require_task(applicant, task_id)?;
        self.store.delete_task(task_id).map_err(|err| match err {
            RepositoryError::NotFound => JourneyError::NotFound(Resource::Task(task_id)),
            other => JourneyError::Store(other),
        })
    }

    pub fn documents(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
    ) -> Result<Vec<DerivedDocument>, JourneyError> {
        let entry = self.require_entry(applicant, university_id)?;
        Ok(self.store.documents_for(entry.id)?)
    }

    pub fn dashboard(&self, applicant: &ApplicantId) -> Result<JourneyDashboard, JourneyError> {
        let profile = self.require_profile(applicant)?;
        let open_tasks = self.tasks(applicant, false)?;
        let shortlist = self.store.shortlist_for(applicant)?;

        let mut committed = Vec::new();
        for entry in shortlist.iter().filter(|entry| entry.locked) {
            let tasks = open_tasks
                .iter()
                .filter(|task| task.university_id == Some(entry.university_id))
                .cloned()
                .collect();
            committed.push(CommittedUniversity {
                entry: entry.clone(),
                university: self.catalog.fetch(entry.university_id)?,
                tasks,
                documents: self.store.documents_for(entry.id)?,
            });
        }

        Ok(JourneyDashboard::new(profile, open_tasks, shortlist, committed))
    }

    /// Persist a stage change through the stage-only store write; other profile fields are
    /// never written back from the copy read at the start of the action.
    fn advance_stage(
        &self,
        profile: ApplicantProfile,
        event: StageEvent,
        now: DateTime<Utc>,
    ) -> Result<ApplicantProfile, JourneyError> {
        let Some(transition) =
            log_transition(&profile, event).filter(|transition| transition.changed())
        else {
            return Ok(profile);
        };
        self.store
            .set_stage(&profile.applicant_id, transition.to, now)
            .map_err(|err| match err {
                RepositoryError::NotFound => JourneyError::NotFound(Resource::Profile),
                other => JourneyError::Store(other),
            })
    }

    fn require_profile(&self, applicant: &ApplicantId) -> Result<ApplicantProfile, JourneyError> {
        self.store
            .fetch_profile(applicant)?
            .ok_or(JourneyError::NotFound(Resource::Profile))
    }

    fn require_entry(
        &self,
        applicant: &ApplicantId,
        university_id: UniversityId,
    ) -> Result<ShortlistEntry, JourneyError> {
        self.store
            .fetch_shortlist(applicant, university_id)?
            .ok_or(JourneyError::NotFound(Resource::ShortlistEntry(university_id)))
    }

    fn require_task(
        &self,
        applicant: &ApplicantId,
        task_id: TaskId,
    ) -> Result<DerivedTask, JourneyError> {
        self.store
            .fetch_task(task_id)?
            .filter(|task| &task.applicant_id == applicant)
            .ok_or(JourneyError::NotFound(Resource::Task(task_id)))
    }
}

fn apply_event(profile: &mut ApplicantProfile, event: StageEvent) -> Option<StageTransition> {
    let transition = log_transition(profile, event)?;
    profile.stage = transition.to;
    Some(transition)
}

fn log_transition(profile: &ApplicantProfile, event: StageEvent) -> Option<StageTransition> {
    match stage::transition(profile.stage, event) {
        Some(transition) => {
            info!(
                applicant = %profile.applicant_id,
                event = event.label(),
                from = transition.from.label(),
                to = transition.to.label(),
                "journey stage transition"
            );
            Some(transition)
        }
        None => {
            debug!(
                applicant = %profile.applicant_id,
                event = event.label(),
                stage = profile.stage.label(),
                "stage event ignored"
            );
            None
        }
    }
}

fn task_title(raw: &str) -> Result<String, JourneyError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(JourneyError::InvalidState(
            "task title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn set_completion(task: &mut DerivedTask, completed: bool, now: DateTime<Utc>) {
    if completed && !task.completed {
        task.completed_at = Some(now);
    } else if !completed {
        task.completed_at = None;
    }
    task.completed = completed;
}

fn newest_first(tasks: &mut [DerivedTask]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn validate_budget(min: f64, max: f64) -> Result<BudgetRange, ProfileValidationError> {
    if min < 0.0 || max < 0.0 {
        return Err(ProfileValidationError::NegativeBudget);
    }
    if min > max {
        return Err(ProfileValidationError::InvertedBudget { min, max });
    }
    Ok(BudgetRange { min, max })
}

fn validate_gpa(gpa: Option<f64>) -> Result<(), ProfileValidationError> {
    match gpa {
        Some(gpa) if !(0.0..=MAX_GPA).contains(&gpa) => {
            Err(ProfileValidationError::GpaOutOfRange(gpa))
        }
        _ => Ok(()),
    }
}

fn already_shortlisted(university_id: UniversityId) -> JourneyError {
    JourneyError::Conflict(format!("university {university_id} is already shortlisted"))
}

fn duplicate_task(title: &str) -> JourneyError {
    JourneyError::Conflict(format!("an open task titled '{title}' already exists"))
}

/// Optional narrowing applied on top of the profile-driven recommendation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecommendationFilter {
    pub country: Option<String>,
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UniversitySearch {
    pub country: Option<String>,
    pub name: Option<String>,
    pub min_ranking: Option<u32>,
    pub max_ranking: Option<u32>,
}

impl UniversitySearch {
    pub fn matches(&self, university: &University) -> bool {
        if let Some(country) = self.country.as_deref() {
            if !country.eq_ignore_ascii_case(&university.country) {
                return false;
            }
        }
        if let Some(name) = self.name.as_deref() {
            let needle = name.to_lowercase();
            if !university.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        // Unranked universities never satisfy a ranking bound.
        if let Some(min) = self.min_ranking {
            if university.ranking.map_or(true, |ranking| ranking < min) {
                return false;
            }
        }
        if let Some(max) = self.max_ranking {
            if university.ranking.map_or(true, |ranking| ranking > max) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LockOutcome {
    pub entry: ShortlistEntry,
    pub stage: JourneyStage,
    pub tasks: GenerationReport,
    pub documents: GenerationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnlockOutcome {
    pub entry: ShortlistEntry,
    pub stage: JourneyStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortlistRemoval {
    pub university_id: UniversityId,
    pub tasks_removed: usize,
    pub documents_removed: usize,
}

/// Entity a [`JourneyError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile,
    University(UniversityId),
    ShortlistEntry(UniversityId),
    Task(TaskId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Profile => f.write_str("profile"),
            Resource::University(id) => write!(f, "university {id}"),
            Resource::ShortlistEntry(id) => write!(f, "shortlist entry for university {id}"),
            Resource::Task(id) => write!(f, "task {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("budget range requires both a minimum and a maximum")]
    MissingBudget,
    #[error("budget minimum {min} exceeds maximum {max}")]
    InvertedBudget { min: f64, max: f64 },
    #[error("budget values must not be negative")]
    NegativeBudget,
    #[error("gpa {0} is outside the 0.0-4.0 scale")]
    GpaOutOfRange(f64),
}

/// Error raised by the journey service.
#[derive(Debug, thiserror::Error)]
pub enum JourneyError {
    #[error("missing resource: {0}")]
    NotFound(Resource),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Validation(#[from] ProfileValidationError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}
