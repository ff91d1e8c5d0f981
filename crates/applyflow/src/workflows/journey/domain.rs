use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity handed to the engine by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniversityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShortlistId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for UniversityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Journey stages in strict forward order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyStage {
    #[default]
    BuildingProfile,
    DiscoveringUniversities,
    FinalizingUniversities,
    PreparingApplications,
}

impl JourneyStage {
    #[cfg(test)]
    pub(crate) const fn ordered() -> [Self; 4] {
        [
            Self::BuildingProfile,
            Self::DiscoveringUniversities,
            Self::FinalizingUniversities,
            Self::PreparingApplications,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BuildingProfile => "Building Profile",
            Self::DiscoveringUniversities => "Discovering Universities",
            Self::FinalizingUniversities => "Finalizing Universities",
            Self::PreparingApplications => "Preparing Applications",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthRating {
    Strong,
    Average,
    Weak,
}

impl StrengthRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Average => "Average",
            Self::Weak => "Weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingPlan {
    SelfFunded,
    ScholarshipDependent,
    LoanDependent,
}

/// Admission difficulty of a university relative to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReachCategory {
    Dream,
    Target,
    Safe,
}

impl ReachCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dream => "dream",
            Self::Target => "target",
            Self::Safe => "safe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChanceBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    Research,
    Documents,
    Requirements,
    Finance,
    Exams,
    Applications,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Sop,
    RecommendationLetter,
    Resume,
    Transcripts,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sop => "Statement of Purpose",
            Self::RecommendationLetter => "Recommendation Letter",
            Self::Resume => "Resume",
            Self::Transcripts => "Transcripts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Drafting,
    Pending,
    Ready,
    Uploaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicBackground {
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<u16>,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyGoals {
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub target_intake_year: Option<u16>,
    #[serde(default)]
    pub preferred_countries: Vec<String>,
}

/// Exam and SOP readiness. `english_test` covers IELTS/TOEFL, `graduate_test` GRE/GMAT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamReadiness {
    pub english_test: ExamStatus,
    pub english_score: Option<f64>,
    pub graduate_test: ExamStatus,
    pub graduate_score: Option<f64>,
    pub sop: ExamStatus,
}

impl ExamReadiness {
    pub fn completed_count(&self) -> usize {
        [self.english_test, self.graduate_test]
            .into_iter()
            .filter(|status| *status == ExamStatus::Completed)
            .count()
    }
}

/// Derived ratings; only ever written by the strength scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStrength {
    pub academic: StrengthRating,
    pub exam: StrengthRating,
    pub overall: StrengthRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub applicant_id: ApplicantId,
    pub onboarding_completed: bool,
    pub stage: JourneyStage,
    pub academics: AcademicBackground,
    pub goals: StudyGoals,
    pub budget: Option<BudgetRange>,
    pub funding_plan: Option<FundingPlan>,
    pub exams: ExamReadiness,
    pub strength: Option<ProfileStrength>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicantProfile {
    /// Blank profile for an applicant who has not started onboarding.
    pub fn new(applicant_id: ApplicantId, now: DateTime<Utc>) -> Self {
        Self {
            applicant_id,
            onboarding_completed: false,
            stage: JourneyStage::BuildingProfile,
            academics: AcademicBackground::default(),
            goals: StudyGoals::default(),
            budget: None,
            funding_plan: None,
            exams: ExamReadiness::default(),
            strength: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_scholarship_dependent(&self) -> bool {
        self.funding_plan == Some(FundingPlan::ScholarshipDependent)
    }
}

/// Full onboarding questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingSubmission {
    pub education_level: String,
    pub major: String,
    pub graduation_year: u16,
    #[serde(default)]
    pub gpa: Option<f64>,
    pub degree: String,
    pub field_of_study: String,
    pub target_intake_year: u16,
    pub preferred_countries: Vec<String>,
    pub budget_min: f64,
    pub budget_max: f64,
    pub funding_plan: FundingPlan,
    pub english_test: ExamStatus,
    #[serde(default)]
    pub english_score: Option<f64>,
    pub graduate_test: ExamStatus,
    #[serde(default)]
    pub graduate_score: Option<f64>,
    pub sop: ExamStatus,
}

/// Partial profile edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<u16>,
    pub gpa: Option<f64>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub target_intake_year: Option<u16>,
    pub preferred_countries: Option<Vec<String>>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub funding_plan: Option<FundingPlan>,
    pub english_test: Option<ExamStatus>,
    pub english_score: Option<f64>,
    pub graduate_test: Option<ExamStatus>,
    pub graduate_score: Option<f64>,
    pub sop: Option<ExamStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuitionRange {
    pub min: f64,
    pub max: f64,
}

impl TuitionRange {
    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Published minimums; absent values fall back to the classifier baselines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversityRequirements {
    pub min_gpa: Option<f64>,
    pub min_test_score: Option<f64>,
    pub min_language_score: Option<f64>,
}

/// Catalogue entry; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub id: UniversityId,
    pub name: String,
    pub country: String,
    pub city: Option<String>,
    pub ranking: Option<u32>,
    /// Percentage of applicants admitted, 0-100.
    pub acceptance_rate: Option<f64>,
    pub tuition: TuitionRange,
    pub requirements: UniversityRequirements,
    pub fields_offered: Vec<String>,
    pub programs: Vec<String>,
    pub description: String,
    pub website_url: Option<String>,
}

impl University {
    pub fn offers_field(&self, field: &str) -> bool {
        let needle = field.trim().to_ascii_lowercase();
        self.fields_offered
            .iter()
            .any(|offered| offered.to_ascii_lowercase().contains(&needle))
    }
}

/// Advisory fields frozen on the shortlist entry at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitAdvisory {
    pub fit_narrative: String,
    pub risk_narrative: String,
    pub chance: ChanceBand,
    pub cost: CostBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub id: ShortlistId,
    pub applicant_id: ApplicantId,
    pub university_id: UniversityId,
    pub category: ReachCategory,
    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub advisory: FitAdvisory,
    pub created_at: DateTime<Utc>,
}

impl ShortlistEntry {
    pub fn lock(&mut self, now: DateTime<Utc>) {
        self.locked = true;
        self.locked_at = Some(now);
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.locked_at = None;
    }
}

/// Shortlist row before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortlistEntry {
    pub applicant_id: ApplicantId,
    pub university_id: UniversityId,
    pub category: ReachCategory,
    pub advisory: FitAdvisory,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTask {
    pub id: TaskId,
    pub applicant_id: ApplicantId,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub system_generated: bool,
    /// University whose lock produced this task, used for cascade deletes.
    pub university_id: Option<UniversityId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub applicant_id: ApplicantId,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub due_date: Option<DateTime<Utc>>,
    pub system_generated: bool,
    pub university_id: Option<UniversityId>,
    pub created_at: DateTime<Utc>,
}

/// Manually authored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub completed: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedDocument {
    pub id: DocumentId,
    pub applicant_id: ApplicantId,
    pub shortlist_id: ShortlistId,
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub applicant_id: ApplicantId,
    pub shortlist_id: ShortlistId,
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
