use chrono::NaiveDate;
use exekutor_cestovne::config::{AppConfig, RoutingConfig};
use exekutor_cestovne::error::AppError;
use exekutor_cestovne::reimbursement::{
    Period, ReimbursementCalculator, ReimbursementService, StatementComposer, VehicleTable,
    WorkerCount,
};
use exekutor_cestovne::routing::{MapyClient, RouteError, RouteLeg, RouteProvider};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Routing backend chosen from configuration. Without an API key every lookup fails with
/// a clear reason instead of inventing a distance.
#[derive(Debug)]
pub(crate) enum ConfiguredRoutes {
    Mapy(MapyClient),
    Unavailable(String),
}

impl ConfiguredRoutes {
    pub(crate) fn from_config(config: &RoutingConfig) -> Self {
        let Some(settings) = config.mapy_settings() else {
            warn!("MAPY_API_KEY is not set; address lookups are disabled");
            return Self::Unavailable("MAPY_API_KEY is not set".to_string());
        };

        match MapyClient::new(settings) {
            Ok(client) => {
                info!(base_url = %config.base_url, "Mapy.cz routing enabled");
                Self::Mapy(client)
            }
            Err(err) => {
                warn!(error = %err, "Mapy.cz client could not be built");
                Self::Unavailable(err.to_string())
            }
        }
    }
}

impl RouteProvider for ConfiguredRoutes {
    fn route(&self, start: &str, end: &str) -> Result<RouteLeg, RouteError> {
        match self {
            Self::Mapy(client) => client.route(start, end),
            Self::Unavailable(reason) => Err(RouteError::NotConfigured(reason.clone())),
        }
    }
}

pub(crate) type AppService = ReimbursementService<ConfiguredRoutes>;

/// Blocking: builds the HTTP client and may read the fleet file.
pub(crate) fn build_service(config: &AppConfig) -> Result<AppService, AppError> {
    let vehicles = match &config.calculation.vehicles_csv {
        Some(path) => {
            let table = VehicleTable::from_path(path)?;
            info!(path = %path.display(), vehicles = table.vehicles().len(), "fleet loaded");
            table
        }
        None => VehicleTable::standard(),
    };

    let routes = Arc::new(ConfiguredRoutes::from_config(&config.routing));
    Ok(ReimbursementService::new(
        routes,
        vehicles,
        ReimbursementCalculator::new(config.calculation.policy),
        StatementComposer::new(config.calculation.statement),
    )
    .with_office_address(config.routing.office_address.clone()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%d.%m.%Y"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or D.M.YYYY ({err})"))
}

pub(crate) fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>().map_err(|err| err.to_string())
}

pub(crate) fn parse_workers(raw: &str) -> Result<WorkerCount, String> {
    raw.parse::<WorkerCount>()
}
