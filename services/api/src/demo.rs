use applyflow::error::AppError;
use applyflow::workflows::catalog::CatalogImporter;
use applyflow::workflows::journey::{
    ApplicantId, ExamStatus, FundingPlan, InMemoryJourneyStore, JourneyError, JourneyService,
    OnboardingSubmission, RecommendationFilter, SystemClock, UniversityCatalog, UniversityId,
    UniversitySearch,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::infra::MemoryJourneyService;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Catalogue CSV to load instead of the bundled seed.
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
    /// University id to shortlist and lock. Defaults to the first recommendation.
    #[arg(long)]
    pub(crate) university: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogListArgs {
    /// Catalogue CSV to load instead of the bundled seed.
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
    /// Only list universities in this country.
    #[arg(long)]
    pub(crate) country: Option<String>,
}

pub(crate) fn run_catalog_listing(args: CatalogListArgs) -> Result<(), AppError> {
    let catalog = CatalogImporter::load_catalog(args.catalog_csv.as_deref())?;
    let search = UniversitySearch {
        country: args.country,
        ..UniversitySearch::default()
    };

    let universities = catalog.all().map_err(JourneyError::from)?;
    println!("University catalogue ({} entries)", catalog.len());
    for university in universities.iter().filter(|university| search.matches(university)) {
        let ranking = university
            .ranking
            .map(|ranking| format!("#{ranking}"))
            .unwrap_or_else(|| "unranked".to_string());
        println!(
            "- [{}] {} ({}) {} | tuition {:.0}-{:.0}",
            university.id,
            university.name,
            university.country,
            ranking,
            university.tuition.min,
            university.tuition.max
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = CatalogImporter::load_catalog(args.catalog_csv.as_deref())?;
    let service: MemoryJourneyService = JourneyService::new(
        Arc::new(InMemoryJourneyStore::new()),
        Arc::new(catalog),
        Arc::new(SystemClock),
    );
    let applicant = ApplicantId("demo-applicant".to_string());

    println!("Applicant journey demo");
    let profile = service.complete_onboarding(&applicant, demo_submission())?;
    println!("- Onboarding complete -> stage {}", profile.stage.label());
    if let Some(strength) = profile.strength {
        println!(
            "  Strength: academic {} | exams {} | overall {}",
            strength.academic.label(),
            strength.exam.label(),
            strength.overall.label()
        );
    }
    print_open_tasks(&service, &applicant)?;

    let recommendations = service.recommendations(&applicant, &RecommendationFilter::default())?;
    println!("\nRecommendations ({})", recommendations.len());
    for university in &recommendations {
        println!(
            "  - [{}] {} ({})",
            university.id, university.name, university.country
        );
    }

    let target = match args.university {
        Some(id) => UniversityId(id),
        None => match recommendations.first() {
            Some(university) => university.id,
            None => {
                println!("No recommendations match the sample profile; nothing to shortlist.");
                return Ok(());
            }
        },
    };

    let entry = service.shortlist(&applicant, target, None)?;
    println!(
        "\nShortlisted university {} as {} (chance {:?}, cost {:?})",
        entry.university_id,
        entry.category.label(),
        entry.advisory.chance,
        entry.advisory.cost
    );
    println!("  Fit: {}", entry.advisory.fit_narrative);
    println!("  Risk: {}", entry.advisory.risk_narrative);

    let outcome = service.lock(&applicant, target)?;
    println!(
        "\nLocked -> stage {} ({} tasks, {} documents generated)",
        outcome.stage.label(),
        outcome.tasks.created,
        outcome.documents.created
    );
    for document in service.documents(&applicant, target)? {
        let due = document
            .due_date
            .map(|due| due.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "no due date".to_string());
        println!(
            "  - {} [{:?}] {}",
            document.kind.label(),
            document.status,
            due
        );
    }
    print_open_tasks(&service, &applicant)?;

    let dashboard = service.dashboard(&applicant)?;
    match serde_json::to_string_pretty(&dashboard.committed) {
        Ok(json) => println!("\nCommitted universities payload:\n{}", json),
        Err(err) => println!("\nCommitted universities payload unavailable: {}", err),
    }

    Ok(())
}

fn print_open_tasks(
    service: &MemoryJourneyService,
    applicant: &ApplicantId,
) -> Result<(), AppError> {
    let tasks = service.tasks(applicant, false)?;
    println!("  Open tasks ({}):", tasks.len());
    for task in tasks {
        let due = task
            .due_date
            .map(|due| due.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("    - [{:?}] {} (due {})", task.priority, task.title, due);
    }
    Ok(())
}

fn demo_submission() -> OnboardingSubmission {
    OnboardingSubmission {
        education_level: "Bachelor's".to_string(),
        major: "Computer Science".to_string(),
        graduation_year: 2025,
        gpa: Some(3.4),
        degree: "Master's".to_string(),
        field_of_study: "Computer Science".to_string(),
        target_intake_year: 2027,
        preferred_countries: vec!["Canada".to_string(), "Germany".to_string()],
        budget_min: 10_000.0,
        budget_max: 35_000.0,
        funding_plan: FundingPlan::ScholarshipDependent,
        english_test: ExamStatus::Completed,
        english_score: Some(7.0),
        graduate_test: ExamStatus::NotStarted,
        graduate_score: None,
        sop: ExamStatus::InProgress,
    }
}
