use crate::infra::{AppState, QuizState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use cadence_quiz::error::AppError;
use cadence_quiz::funnel::catalog::{phase_label, Question, QuestionCatalog};
use cadence_quiz::funnel::domain::{QuestionId, QuizResponse, UserInfo, DEFAULT_DISPLAY_NAME};
use cadence_quiz::funnel::handoff::{resolve_results, ResultsView, SessionHandoff, SessionId};
use cadence_quiz::funnel::leads::LeadSubmission;
use cadence_quiz::funnel::personalization::{derive, PersonalizationResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogQuery {
    #[serde(default)]
    pub(crate) gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) phases: Vec<&'static str>,
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonalizeRequest {
    #[serde(default)]
    pub(crate) responses: QuizResponse,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserSubmission {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) opt_in: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) responses: QuizResponse,
    pub(crate) user: UserSubmission,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) session_id: SessionId,
}

pub(crate) fn quiz_router(state: QuizState) -> Router {
    Router::new()
        .route("/api/v1/quiz/questions", get(catalog_endpoint))
        .route("/api/v1/quiz/personalize", post(personalize_endpoint))
        .route("/api/v1/quiz/submit", post(submit_endpoint))
        .route("/api/v1/quiz/results/:session_id", get(results_endpoint))
        .with_state(state)
}

pub(crate) fn with_quiz_routes(state: QuizState) -> Router {
    quiz_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_endpoint(Query(query): Query<CatalogQuery>) -> Json<CatalogResponse> {
    let catalog = QuestionCatalog::standard();
    let questions = match query.gender.as_deref() {
        Some(gender) => {
            let responses = QuizResponse::new().with_answer(QuestionId::Gender, gender);
            catalog
                .visible_questions(&responses)
                .into_iter()
                .cloned()
                .collect()
        }
        None => catalog.questions().to_vec(),
    };

    let mut phases: Vec<&'static str> = questions
        .iter()
        .filter_map(|question| phase_label(question.phase))
        .collect();
    phases.dedup();

    Json(CatalogResponse { phases, questions })
}

pub(crate) async fn personalize_endpoint(
    Json(request): Json<PersonalizeRequest>,
) -> Json<PersonalizationResult> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME);

    Json(derive(&request.responses, name))
}

pub(crate) async fn submit_endpoint(
    State(state): State<QuizState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let SubmitRequest { responses, user } = request;
    let user = UserInfo::capture(&user.name, &user.email, user.opt_in)?;
    let completed_at = Utc::now();

    let lead = LeadSubmission::new(&responses, &user, completed_at);
    let session_id = SessionId::next();
    SessionHandoff::new(responses, user, completed_at).save(state.handoffs.as_ref(), &session_id)?;

    state.leads.spawn(lead);
    info!(session = %session_id, "quiz submitted");

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { session_id })))
}

pub(crate) async fn results_endpoint(
    State(state): State<QuizState>,
    Path(session_id): Path<String>,
) -> Json<ResultsView> {
    let session_id = SessionId::new(session_id);
    Json(resolve_results(
        state.handoffs.as_ref(),
        &session_id,
        Utc::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cadence_quiz::funnel::leads::LeadForwarder;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> (Router, QuizState) {
        let state = QuizState::new(LeadForwarder::disabled());
        (quiz_router(state.clone()), state)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn catalog_hides_hormonal_question_for_men() {
        let (router, _) = router();

        let men = json_body(
            router
                .clone()
                .oneshot(get_request("/api/v1/quiz/questions?gender=male"))
                .await
                .expect("response"),
        )
        .await;
        let everyone = json_body(
            router
                .oneshot(get_request("/api/v1/quiz/questions"))
                .await
                .expect("response"),
        )
        .await;

        assert_eq!(men["questions"].as_array().map(Vec::len), Some(13));
        assert_eq!(everyone["questions"].as_array().map(Vec::len), Some(14));
        assert_eq!(everyone["phases"][0], "Sleep Baseline");
    }

    #[tokio::test]
    async fn personalize_defaults_the_name() {
        let (router, _) = router();

        let response = router
            .oneshot(post_json(
                "/api/v1/quiz/personalize",
                json!({ "responses": { "q1_sleep_quality": "rarely_restful" } }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["headline"], "Friend, Let's Fix Sleep from the Root");
        assert_eq!(body["bundle"], "sleep_only");
    }

    #[tokio::test]
    async fn personalize_ignores_unknown_non_string_fields() {
        let (router, _) = router();

        let response = router
            .oneshot(post_json(
                "/api/v1/quiz/personalize",
                json!({
                    "responses": {
                        "q1_sleep_quality": "hard_fall",
                        "utm_score": 5,
                        "quiz_meta": { "v": 1 }
                    },
                    "name": "Ada"
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["primaryIssue"], "sleep_onset");
        assert_eq!(body["headline"], "Ada, Let's Get You to Sleep Faster");
    }

    #[tokio::test]
    async fn submit_rejects_invalid_email_inline() {
        let (router, state) = router();

        let response = router
            .oneshot(post_json(
                "/api/v1/quiz/submit",
                json!({ "responses": {}, "user": { "name": "Ola", "email": "ola.example.com" } }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Please enter a valid email address.");
        assert_eq!(state.handoffs.len(), 0);
    }

    #[tokio::test]
    async fn submitted_session_is_read_once_then_falls_back_to_demo() {
        let (router, _) = router();

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/v1/quiz/submit",
                json!({
                    "responses": {
                        "q1_sleep_quality": "wake_night",
                        "q10_previous_attempts": ["magnesium"]
                    },
                    "user": { "name": " Theo ", "email": "theo@example.com", "optIn": true }
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let session_id = json_body(response).await["session_id"]
            .as_str()
            .expect("session id")
            .to_string();

        let uri = format!("/api/v1/quiz/results/{session_id}");
        let first = json_body(router.clone().oneshot(get_request(&uri)).await.expect("response")).await;
        let second = json_body(router.oneshot(get_request(&uri)).await.expect("response")).await;

        assert_eq!(first["source"], "session");
        assert_eq!(first["user"]["name"], "Theo");
        assert_eq!(
            first["personalization"]["headline"],
            "Theo, Let's Help You Stay Asleep"
        );
        assert_eq!(first["bonus_code"], "QUIZ10");
        assert_eq!(second["source"], "demo");
        assert_eq!(second["user"]["name"], "Sarah");
    }

    #[tokio::test]
    async fn unknown_session_serves_demo_results() {
        let (router, _) = router();

        let body = json_body(
            router
                .oneshot(get_request("/api/v1/quiz/results/quiz-999999"))
                .await
                .expect("response"),
        )
        .await;

        assert_eq!(body["source"], "demo");
        assert_eq!(body["personalization"]["bundle"], "stress_sleep");
        assert_eq!(body["price_summary"]["total_cents"], 5797);
    }
}
