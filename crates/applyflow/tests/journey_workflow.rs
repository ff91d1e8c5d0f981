//! End-to-end scenarios for the applicant journey, driven through the public service facade
//! and HTTP router against the bundled university catalogue.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use applyflow::workflows::catalog::CatalogImporter;
    use applyflow::workflows::journey::{
        ApplicantId, ExamStatus, FixedClock, FundingPlan, InMemoryCatalog, InMemoryJourneyStore,
        JourneyService, OnboardingSubmission, UniversityId,
    };

    pub(super) const IMPERIAL: UniversityId = UniversityId(7);
    pub(super) const UBC: UniversityId = UniversityId(9);

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn applicant() -> ApplicantId {
        ApplicantId("grace".to_string())
    }

    pub(super) fn submission() -> OnboardingSubmission {
        OnboardingSubmission {
            education_level: "Bachelor's".to_string(),
            major: "Mathematics".to_string(),
            graduation_year: 2024,
            gpa: Some(3.4),
            degree: "Master's".to_string(),
            field_of_study: "Computer Science".to_string(),
            target_intake_year: 2027,
            preferred_countries: vec!["UK".to_string(), "Canada".to_string()],
            budget_min: 20_000.0,
            budget_max: 40_000.0,
            funding_plan: FundingPlan::SelfFunded,
            english_test: ExamStatus::NotStarted,
            english_score: None,
            graduate_test: ExamStatus::Completed,
            graduate_score: Some(312.0),
            sop: ExamStatus::NotStarted,
        }
    }

    pub(super) type Service = JourneyService<InMemoryJourneyStore, InMemoryCatalog>;

    pub(super) fn build_service() -> (Service, Arc<InMemoryJourneyStore>, Arc<FixedClock>) {
        let catalog = CatalogImporter::load_catalog(None).expect("seed catalogue loads");
        let store = Arc::new(InMemoryJourneyStore::new());
        let clock = Arc::new(FixedClock::new(now()));
        let service = JourneyService::new(store.clone(), Arc::new(catalog), clock.clone());
        (service, store, clock)
    }
}

mod journey {
    use super::common::*;
    use applyflow::workflows::journey::{
        ChanceBand, CostBand, JourneyError, JourneyStage, JourneyStore, ReachCategory,
        RecommendationFilter, StrengthRating, TaskPriority,
    };
    use chrono::Duration;

    #[test]
    fn onboarding_suggests_tasks_for_unstarted_readiness_items() {
        let (service, store, _) = build_service();
        let profile = service
            .complete_onboarding(&applicant(), submission())
            .expect("onboarding succeeds");

        assert_eq!(profile.stage, JourneyStage::DiscoveringUniversities);
        let strength = profile.strength.expect("ratings");
        assert_eq!(strength.academic, StrengthRating::Average);
        assert_eq!(strength.exam, StrengthRating::Average);

        let mut titles: Vec<String> = store
            .tasks_for(&applicant())
            .expect("tasks")
            .into_iter()
            .map(|task| task.title)
            .collect();
        titles.sort();
        assert_eq!(
            titles,
            vec![
                "Register for IELTS/TOEFL".to_string(),
                "Research Universities".to_string(),
                "Start SOP Draft".to_string(),
            ]
        );
    }

    #[test]
    fn recommendations_follow_countries_and_budget_headroom() {
        let (service, _, _) = build_service();
        service
            .complete_onboarding(&applicant(), submission())
            .expect("onboarding succeeds");

        let names: Vec<String> = service
            .recommendations(&applicant(), &RecommendationFilter::default())
            .expect("recommendations")
            .into_iter()
            .map(|university| university.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "University of Oxford".to_string(),
                "University of Cambridge".to_string(),
                "Imperial College London".to_string(),
                "University of Toronto".to_string(),
                "University of British Columbia".to_string(),
            ]
        );
    }

    #[test]
    fn journey_runs_from_onboarding_to_applications_and_back() {
        let (service, store, clock) = build_service();
        let grace = applicant();
        service
            .complete_onboarding(&grace, submission())
            .expect("onboarding succeeds");

        let imperial = service.shortlist(&grace, IMPERIAL, None).expect("shortlist");
        assert_eq!(imperial.category, ReachCategory::Target);
        assert_eq!(imperial.advisory.chance, ChanceBand::Medium);
        assert_eq!(imperial.advisory.cost, CostBand::Medium);

        let ubc = service.shortlist(&grace, UBC, None).expect("shortlist");
        assert_eq!(ubc.category, ReachCategory::Safe);
        assert_eq!(ubc.advisory.chance, ChanceBand::High);
        assert_eq!(
            service.profile(&grace).expect("profile").stage,
            JourneyStage::FinalizingUniversities
        );

        clock.advance(Duration::days(2));
        let locked = service.lock(&grace, IMPERIAL).expect("lock");
        assert_eq!(locked.stage, JourneyStage::PreparingApplications);
        assert_eq!(locked.tasks.created, 7);

        let deadlines = store
            .tasks_for(&grace)
            .expect("tasks")
            .into_iter()
            .find(|task| task.title == "Research Imperial College London application deadlines")
            .expect("deadline task");
        assert_eq!(deadlines.due_date, Some(now() + Duration::days(5)));
        assert_eq!(deadlines.university_id, Some(IMPERIAL));

        let scholarships = store
            .tasks_for(&grace)
            .expect("tasks")
            .into_iter()
            .find(|task| task.title.starts_with("Research scholarships"))
            .expect("scholarship task");
        assert_eq!(scholarships.priority, TaskPriority::Low);

        let unlocked = service.unlock(&grace, IMPERIAL).expect("unlock");
        assert_eq!(unlocked.stage, JourneyStage::FinalizingUniversities);

        let removal = service.remove_shortlist(&grace, IMPERIAL).expect("remove");
        assert_eq!(removal.tasks_removed, 7);
        assert_eq!(removal.documents_removed, 4);
        assert_eq!(service.shortlisted(&grace).expect("shortlist").len(), 1);
    }

    #[test]
    fn shortlisting_before_onboarding_is_rejected() {
        let (service, _, _) = build_service();
        match service.shortlist(&applicant(), UBC, None) {
            Err(JourneyError::InvalidState(message)) => assert!(message.contains("profile")),
            other => panic!("expected invalid state, got {other:?}"),
        }
    }
}

mod routing {
    use super::common::*;
    use applyflow::workflows::journey::{journey_router, APPLICANT_HEADER};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(APPLICANT_HEADER, "grace")
            .header("content-type", "application/json");
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).expect("serialize body")),
            None => Body::empty(),
        };
        builder.body(body).expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn http_flow_reaches_the_dashboard() {
        let (service, _, _) = build_service();
        let router = journey_router(Arc::new(service));

        let onboarding = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/journey/onboarding",
                Some(serde_json::to_value(submission()).expect("serialize submission")),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(onboarding.status(), StatusCode::OK);

        let shortlisted = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/journey/shortlist",
                Some(json!({ "university_id": UBC.0 })),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(shortlisted.status(), StatusCode::CREATED);

        let locked = router
            .clone()
            .oneshot(request("POST", "/api/v1/journey/shortlist/9/lock", None))
            .await
            .expect("router dispatch");
        assert_eq!(locked.status(), StatusCode::OK);

        let dashboard = router
            .clone()
            .oneshot(request("GET", "/api/v1/journey/dashboard", None))
            .await
            .expect("router dispatch");
        assert_eq!(dashboard.status(), StatusCode::OK);

        let payload = json_body(dashboard).await;
        assert_eq!(payload.get("stage"), Some(&json!("PREPARING_APPLICATIONS")));
        assert_eq!(payload.get("locked_count"), Some(&json!(1)));
        assert_eq!(
            payload["committed"][0]["university"]["name"],
            json!("University of British Columbia")
        );
        assert_eq!(
            payload["committed"][0]["documents"]
                .as_array()
                .map(Vec::len),
            Some(4)
        );
    }

    #[tokio::test]
    async fn unknown_university_is_not_found() {
        let (service, _, _) = build_service();
        let router = journey_router(Arc::new(service));

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/journey/shortlist",
                Some(json!({ "university_id": 999 })),
            ))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = json_body(response).await;
        assert_eq!(
            payload.get("error").and_then(Value::as_str),
            Some("missing resource: university 999")
        );
    }
}
