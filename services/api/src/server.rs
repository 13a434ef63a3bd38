use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryConversationStore, InMemoryFeedbackStore};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bridging_brain::advisor::{AdvisorService, OfflineAdvisor};
use bridging_brain::catalogue::{Catalogue, CatalogueImporter, CatalogueStore};
use bridging_brain::config::AppConfig;
use bridging_brain::error::AppError;
use bridging_brain::matching::MatchingService;
use bridging_brain::telemetry;
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
    if let Some(path) = args.catalogue.take() {
        config.catalogue.path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let catalogue = match &config.catalogue.path {
        Some(path) => CatalogueImporter::from_path(path)?,
        None => {
            warn!("no lender catalogue configured; serving an empty catalogue");
            Catalogue::default()
        }
    };
    let catalogue = Arc::new(CatalogueStore::new(catalogue));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalogue: catalogue.clone(),
        ai_available: config.advisor.api_key_present,
    };

    let matching = Arc::new(MatchingService::new(catalogue.clone()));
    let advisor = Arc::new(AdvisorService::new(
        Arc::new(InMemoryConversationStore::default()),
        Arc::new(InMemoryFeedbackStore::default()),
        Arc::new(OfflineAdvisor),
        catalogue.clone(),
        config.advisor.rate_limit_per_hour,
    ));

    let app = with_service_routes(matching, advisor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        lender_count = catalogue.len(),
        "bridging brain ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
