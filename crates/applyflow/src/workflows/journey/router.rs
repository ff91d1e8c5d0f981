use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{
    ApplicantId, OnboardingSubmission, ProfilePatch, ReachCategory, TaskDraft, TaskId, TaskPatch,
    UniversityId,
};
use super::repository::{JourneyStore, UniversityCatalog};
use super::service::{JourneyError, JourneyService, RecommendationFilter, UniversitySearch};

/// Header set by the authentication layer in front of this router.
pub const APPLICANT_HEADER: &str = "x-applicant-id";

type SharedService<S, C> = Arc<JourneyService<S, C>>;

/// Router builder exposing the applicant journey under `/api/v1/journey`.
pub fn journey_router<S, C>(service: SharedService<S, C>) -> Router
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    Router::new()
        .route("/api/v1/journey/onboarding", post(onboarding_handler::<S, C>))
        .route(
            "/api/v1/journey/profile",
            get(profile_handler::<S, C>).patch(update_profile_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/universities/search",
            get(search_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/universities/recommendations",
            get(recommendations_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/shortlist",
            get(shortlisted_handler::<S, C>).post(shortlist_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/shortlist/:university_id",
            axum::routing::delete(remove_shortlist_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/shortlist/:university_id/lock",
            post(lock_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/shortlist/:university_id/unlock",
            post(unlock_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/shortlist/:university_id/documents",
            get(documents_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/tasks",
            get(tasks_handler::<S, C>).post(create_task_handler::<S, C>),
        )
        .route(
            "/api/v1/journey/tasks/:task_id",
            patch(update_task_handler::<S, C>).delete(delete_task_handler::<S, C>),
        )
        .route("/api/v1/journey/dashboard", get(dashboard_handler::<S, C>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShortlistRequest {
    university_id: UniversityId,
    #[serde(default)]
    category: Option<ReachCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TaskQuery {
    include_completed: bool,
}

fn applicant_from(headers: &HeaderMap) -> Result<ApplicantId, Response> {
    headers
        .get(APPLICANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| ApplicantId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing {APPLICANT_HEADER} header"),
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, JourneyError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

/// HTTP status for each journey failure; shared with `AppError`.
pub(crate) fn status_for(error: &JourneyError) -> StatusCode {
    match error {
        JourneyError::NotFound(_) => StatusCode::NOT_FOUND,
        JourneyError::Conflict(_) => StatusCode::CONFLICT,
        JourneyError::InvalidState(_) | JourneyError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        JourneyError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: JourneyError) -> Response {
    if let JourneyError::Store(err) = &error {
        warn!(error = %err, "journey store failure");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), Json(payload)).into_response()
}

fn path_rejection_response(rejection: PathRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

macro_rules! path_or_reject {
    ($path:expr) => {
        match $path {
            Ok(Path(value)) => value,
            Err(rejection) => return path_rejection_response(rejection),
        }
    };
}

macro_rules! applicant_or_reject {
    ($headers:expr) => {
        match applicant_from(&$headers) {
            Ok(applicant) => applicant,
            Err(rejection) => return rejection,
        }
    };
}

pub(crate) async fn onboarding_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Json(submission): Json<OnboardingSubmission>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.complete_onboarding(&applicant, submission),
    )
}

pub(crate) async fn profile_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.profile(&applicant))
}

pub(crate) async fn update_profile_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Json(patch): Json<ProfilePatch>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.update_profile(&applicant, patch))
}

pub(crate) async fn search_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Query(search): Query<UniversitySearch>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let _applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.search_universities(&search))
}

pub(crate) async fn recommendations_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Query(filter): Query<RecommendationFilter>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.recommendations(&applicant, &filter))
}

pub(crate) async fn shortlisted_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.shortlisted(&applicant))
}

pub(crate) async fn shortlist_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Json(request): Json<ShortlistRequest>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(
        StatusCode::CREATED,
        service.shortlist(&applicant, request.university_id, request.category),
    )
}

pub(crate) async fn remove_shortlist_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    university_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let university_id = path_or_reject!(university_id);
    respond(
        StatusCode::OK,
        service.remove_shortlist(&applicant, UniversityId(university_id)),
    )
}

pub(crate) async fn lock_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    university_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let university_id = path_or_reject!(university_id);
    respond(
        StatusCode::OK,
        service.lock(&applicant, UniversityId(university_id)),
    )
}

pub(crate) async fn unlock_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    university_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let university_id = path_or_reject!(university_id);
    respond(
        StatusCode::OK,
        service.unlock(&applicant, UniversityId(university_id)),
    )
}

pub(crate) async fn documents_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    university_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let university_id = path_or_reject!(university_id);
    respond(
        StatusCode::OK,
        service.documents(&applicant, UniversityId(university_id)),
    )
}

pub(crate) async fn tasks_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.tasks(&applicant, query.include_completed),
    )
}

pub(crate) async fn create_task_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::CREATED, service.create_task(&applicant, draft))
}

pub(crate) async fn update_task_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    task_id: Result<Path<u64>, PathRejection>,
    Json(patch): Json<TaskPatch>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let task_id = path_or_reject!(task_id);
    respond(
        StatusCode::OK,
        service.update_task(&applicant, TaskId(task_id), patch),
    )
}

pub(crate) async fn delete_task_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
    task_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    let task_id = path_or_reject!(task_id);
    match service.delete_task(&applicant, TaskId(task_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<S, C>(
    State(service): State<SharedService<S, C>>,
    headers: HeaderMap,
) -> Response
where
    S: JourneyStore + 'static,
    C: UniversityCatalog + 'static,
{
    let applicant = applicant_or_reject!(headers);
    respond(StatusCode::OK, service.dashboard(&applicant))
}
