use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use cadence_quiz::funnel::domain::{PreviousAttempt, QuizResponse, SleepQuality, UserInfo};
use cadence_quiz::funnel::leads::{
    KlaviyoClient, LeadForwarder, LeadOutcome, LeadSubmission, SUBSCRIPTION_JOBS_PATH,
};
use chrono::Utc;
use serde_json::Value;

#[derive(Clone)]
struct FakeMarketingApi {
    status: StatusCode,
    received: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn subscription_jobs(
    State(api): State<FakeMarketingApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    api.received
        .lock()
        .expect("capture mutex")
        .push((headers, body));
    let body = if api.status.is_success() {
        ""
    } else {
        r#"{"errors":[{"code":"throttled"}]}"#
    };
    (api.status, body)
}

async fn spawn_api(status: StatusCode) -> (SocketAddr, FakeMarketingApi) {
    let api = FakeMarketingApi {
        status,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .route(
            &format!("/api{SUBSCRIPTION_JOBS_PATH}"),
            post(subscription_jobs),
        )
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake api");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fake api");
    });
    (addr, api)
}

fn lead(opt_in: bool) -> LeadSubmission {
    let responses = QuizResponse::new()
        .choose(SleepQuality::HardFall)
        .select([PreviousAttempt::Melatonin]);
    let user = UserInfo::capture("Mina", "mina@example.com", opt_in).expect("valid email");
    LeadSubmission::new(&responses, &user, Utc::now())
}

fn forwarder(addr: SocketAddr) -> LeadForwarder<KlaviyoClient> {
    let client = KlaviyoClient::new(
        &format!("http://{addr}/api/"),
        "pk_test_123",
        "RdvieM",
        "2024-10-15",
    )
    .expect("client");
    LeadForwarder::new(client)
}

#[tokio::test]
async fn delivers_subscription_job_with_headers() {
    let (addr, api) = spawn_api(StatusCode::ACCEPTED).await;

    let outcome = forwarder(addr).forward(&lead(true)).await;

    assert_eq!(outcome, LeadOutcome::Delivered);
    let received = api.received.lock().expect("capture mutex");
    assert_eq!(received.len(), 1);
    let (headers, body) = &received[0];
    assert_eq!(headers["authorization"], "Klaviyo-API-Key pk_test_123");
    assert_eq!(headers["revision"], "2024-10-15");
    assert_eq!(body["data"]["attributes"]["list_id"], "RdvieM");
    let profile = &body["data"]["attributes"]["profiles"]["data"][0]["attributes"];
    assert_eq!(profile["email"], "mina@example.com");
    assert_eq!(
        profile["subscriptions"]["email"]["marketing"]["consent"],
        "SUBSCRIBED"
    );
    assert_eq!(profile["properties"]["primary_issue"], "sleep_onset");
    assert_eq!(profile["properties"]["tried_melatonin"], true);
}

#[tokio::test]
async fn rejected_subscription_is_swallowed() {
    let (addr, api) = spawn_api(StatusCode::TOO_MANY_REQUESTS).await;

    let outcome = forwarder(addr).spawn(lead(false)).await.expect("join");

    assert_eq!(outcome, LeadOutcome::Rejected { status: 429 });
    assert_eq!(api.received.lock().expect("capture mutex").len(), 1);
}

#[tokio::test]
async fn unreachable_api_is_reported_as_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let outcome = forwarder(addr).forward(&lead(true)).await;

    assert!(matches!(outcome, LeadOutcome::Failed { .. }));
}
