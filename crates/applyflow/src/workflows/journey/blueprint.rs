use super::domain::{
    ApplicantProfile, DocumentKind, DocumentStatus, ExamStatus, TaskCategory, TaskPriority,
};
use chrono::{DateTime, Duration, Utc};

const UNIVERSITY_PLACEHOLDER: &str = "{university}";
const COUNTRIES_PLACEHOLDER: &str = "{countries}";

/// Due date relative to the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueRule {
    DaysAfter(i64),
    Unscheduled,
}

impl DueRule {
    pub(crate) fn resolve(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DueRule::DaysAfter(days) => Some(from + Duration::days(*days)),
            DueRule::Unscheduled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityRule {
    Fixed(TaskPriority),
    /// Elevated when the applicant depends on scholarships.
    FundingSensitive {
        scholarship_dependent: TaskPriority,
        otherwise: TaskPriority,
    },
}

impl PriorityRule {
    pub(crate) fn resolve(&self, profile: &ApplicantProfile) -> TaskPriority {
        match self {
            PriorityRule::Fixed(priority) => *priority,
            PriorityRule::FundingSensitive {
                scholarship_dependent,
                otherwise,
            } => {
                if profile.is_scholarship_dependent() {
                    *scholarship_dependent
                } else {
                    *otherwise
                }
            }
        }
    }
}

/// Task produced for every locked university. `{university}` is replaced by its name.
#[derive(Debug, Clone)]
pub struct LockTaskTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: PriorityRule,
    pub category: TaskCategory,
    pub due: DueRule,
}

impl LockTaskTemplate {
    pub fn title_for(&self, university_name: &str) -> String {
        self.title.replace(UNIVERSITY_PLACEHOLDER, university_name)
    }

    pub fn description_for(&self, university_name: &str) -> String {
        self.description
            .replace(UNIVERSITY_PLACEHOLDER, university_name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentTemplate {
    pub kind: DocumentKind,
    pub initial_status: DocumentStatus,
    pub due: DueRule,
}

/// Which readiness gap a starter task addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterTrigger {
    EnglishTestNotStarted,
    GraduateTestNotStarted,
    SopNotStarted,
    Always,
}

impl StarterTrigger {
    pub(crate) fn applies(&self, profile: &ApplicantProfile) -> bool {
        match self {
            StarterTrigger::EnglishTestNotStarted => {
                profile.exams.english_test == ExamStatus::NotStarted
            }
            StarterTrigger::GraduateTestNotStarted => {
                profile.exams.graduate_test == ExamStatus::NotStarted
            }
            StarterTrigger::SopNotStarted => profile.exams.sop == ExamStatus::NotStarted,
            StarterTrigger::Always => true,
        }
    }
}

/// Task suggested once onboarding is completed.
#[derive(Debug, Clone)]
pub struct StarterTaskTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub trigger: StarterTrigger,
}

impl StarterTaskTemplate {
    pub fn description_for(&self, profile: &ApplicantProfile) -> String {
        let countries = if profile.goals.preferred_countries.is_empty() {
            "your preferred countries".to_string()
        } else {
            profile.goals.preferred_countries.join(", ")
        };
        self.description.replace(COUNTRIES_PLACEHOLDER, &countries)
    }
}

/// Fixed catalogue of derived work.
#[derive(Debug)]
pub struct ApplicationBlueprint {
    lock_tasks: Vec<LockTaskTemplate>,
    documents: Vec<DocumentTemplate>,
    starter_tasks: Vec<StarterTaskTemplate>,
}

impl ApplicationBlueprint {
    pub fn standard() -> Self {
        Self {
            lock_tasks: standard_lock_tasks(),
            documents: standard_documents(),
            starter_tasks: standard_starter_tasks(),
        }
    }

    pub fn lock_tasks(&self) -> &[LockTaskTemplate] {
        &self.lock_tasks
    }

    pub fn documents(&self) -> &[DocumentTemplate] {
        &self.documents
    }

    pub fn starter_tasks(&self) -> &[StarterTaskTemplate] {
        &self.starter_tasks
    }
}

impl Default for ApplicationBlueprint {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_lock_tasks() -> Vec<LockTaskTemplate> {
    vec![
        LockTaskTemplate {
            key: "research_deadlines",
            title: "Research {university} application deadlines",
            description: "Find and note all deadlines for {university} including application, financial aid, and scholarship deadlines.",
            priority: PriorityRule::Fixed(TaskPriority::High),
            category: TaskCategory::Research,
            due: DueRule::DaysAfter(3),
        },
        LockTaskTemplate {
            key: "tailor_sop",
            title: "Tailor SOP for {university}",
            description: "Customize your Statement of Purpose specifically for {university}, highlighting why this university aligns with your goals.",
            priority: PriorityRule::Fixed(TaskPriority::High),
            category: TaskCategory::Documents,
            due: DueRule::DaysAfter(14),
        },
        LockTaskTemplate {
            key: "review_requirements",
            title: "Review {university} specific requirements",
            description: "Check program-specific requirements for {university} including transcripts, test scores, and additional documents.",
            priority: PriorityRule::Fixed(TaskPriority::High),
            category: TaskCategory::Requirements,
            due: DueRule::DaysAfter(7),
        },
        LockTaskTemplate {
            key: "prepare_budget",
            title: "Prepare application budget for {university}",
            description: "Calculate total costs including application fee, tuition, living expenses, and travel for {university}.",
            priority: PriorityRule::Fixed(TaskPriority::Medium),
            category: TaskCategory::Finance,
            due: DueRule::DaysAfter(10),
        },
        LockTaskTemplate {
            key: "research_scholarships",
            title: "Research scholarships at {university}",
            description: "Find scholarship opportunities specific to {university} and prepare required documents.",
            priority: PriorityRule::FundingSensitive {
                scholarship_dependent: TaskPriority::Medium,
                otherwise: TaskPriority::Low,
            },
            category: TaskCategory::Finance,
            due: DueRule::DaysAfter(14),
        },
        LockTaskTemplate {
            key: "recommendation_letters",
            title: "Get recommendation letters for {university}",
            description: "Request and collect recommendation letters tailored for {university}'s requirements.",
            priority: PriorityRule::Fixed(TaskPriority::High),
            category: TaskCategory::Documents,
            due: DueRule::DaysAfter(21),
        },
        LockTaskTemplate {
            key: "verify_scores",
            title: "Verify test score requirements for {university}",
            description: "Ensure your IELTS/TOEFL and GRE/GMAT scores meet {university}'s minimum requirements.",
            priority: PriorityRule::Fixed(TaskPriority::High),
            category: TaskCategory::Exams,
            due: DueRule::DaysAfter(5),
        },
    ]
}

fn standard_documents() -> Vec<DocumentTemplate> {
    vec![
        DocumentTemplate {
            kind: DocumentKind::Sop,
            initial_status: DocumentStatus::Drafting,
            due: DueRule::DaysAfter(14),
        },
        DocumentTemplate {
            kind: DocumentKind::RecommendationLetter,
            initial_status: DocumentStatus::Pending,
            due: DueRule::DaysAfter(21),
        },
        DocumentTemplate {
            kind: DocumentKind::Resume,
            initial_status: DocumentStatus::Ready,
            due: DueRule::Unscheduled,
        },
        DocumentTemplate {
            kind: DocumentKind::Transcripts,
            initial_status: DocumentStatus::Ready,
            due: DueRule::Unscheduled,
        },
    ]
}

fn standard_starter_tasks() -> Vec<StarterTaskTemplate> {
    vec![
        StarterTaskTemplate {
            key: "register_english_test",
            title: "Register for IELTS/TOEFL",
            description: "Book your English proficiency test",
            priority: TaskPriority::High,
            category: TaskCategory::Exams,
            trigger: StarterTrigger::EnglishTestNotStarted,
        },
        StarterTaskTemplate {
            key: "start_graduate_test_prep",
            title: "Start GRE/GMAT Preparation",
            description: "Begin preparing for your standardized test",
            priority: TaskPriority::High,
            category: TaskCategory::Exams,
            trigger: StarterTrigger::GraduateTestNotStarted,
        },
        StarterTaskTemplate {
            key: "start_sop_draft",
            title: "Start SOP Draft",
            description: "Begin writing your Statement of Purpose",
            priority: TaskPriority::Medium,
            category: TaskCategory::Documents,
            trigger: StarterTrigger::SopNotStarted,
        },
        StarterTaskTemplate {
            key: "research_universities",
            title: "Research Universities",
            description: "Explore universities in {countries}",
            priority: TaskPriority::High,
            category: TaskCategory::Research,
            trigger: StarterTrigger::Always,
        },
    ]
}
