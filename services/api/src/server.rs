use crate::cli::ServeArgs;
use crate::infra::{AppState, QuizState};
use crate::routes::with_quiz_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cadence_quiz::config::AppConfig;
use cadence_quiz::error::AppError;
use cadence_quiz::funnel::leads::{KlaviyoClient, LeadForwarder};
use cadence_quiz::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let leads = match LeadForwarder::<KlaviyoClient>::from_config(&config.marketing) {
        Ok(forwarder) => forwarder,
        Err(err) => {
            warn!(error = %err, "lead forwarding disabled");
            LeadForwarder::disabled()
        }
    };
    if !leads.is_enabled() {
        warn!("KLAVIYO_API_KEY not set, leads will not be forwarded");
    }

    let app = with_quiz_routes(QuizState::new(leads))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, list_id = %config.marketing.list_id, "quiz funnel ready");

    axum::serve(listener, app).await?;
    Ok(())
}
