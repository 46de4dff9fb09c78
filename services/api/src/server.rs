use crate::cli::ServeArgs;
use crate::infra::{seed_agents, seed_schemes, AppState, LoggingNotifier};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use solar_subsidy::config::AppConfig;
use solar_subsidy::error::AppError;
use solar_subsidy::telemetry;
use solar_subsidy::workflows::applications::{
    ApplicationLifecycleService, InMemoryLifecycleStore,
};
use solar_subsidy::workflows::estimator::{CalculatorState, InMemoryRegionCatalog};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryLifecycleStore::with_reference_data(
        seed_schemes(),
        seed_agents(),
    ));
    let notifier = Arc::new(LoggingNotifier::default());
    let lifecycle = Arc::new(ApplicationLifecycleService::new(store, notifier));
    let calculator = Arc::new(CalculatorState {
        catalog: Arc::new(InMemoryRegionCatalog::with_defaults()),
        default_region: config.calculator.default_region.clone(),
    });

    let app = with_service_routes(lifecycle, calculator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_region = %config.calculator.default_region,
        "solar subsidy service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
