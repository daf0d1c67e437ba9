use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::error;

use super::calculator::ReimbursementResult;
use super::service::{CalculationRequest, ReimbursementError, ReimbursementService};
use super::statement::{worker_label, Statement};
use super::tariff::{resolve, supported_periods, Period};
use super::time_loss::{TimeUnitKind, WorkerCount};
use super::vehicle::Vehicle;
use crate::batch::{self, BatchError, BatchInput, BatchRow, BatchSummary};
use crate::routing::RouteProvider;

/// Router builder exposing calculation, statement and batch endpoints.
pub fn reimbursement_router<P>(service: Arc<ReimbursementService<P>>) -> Router
where
    P: RouteProvider + 'static,
{
    Router::new()
        .route("/api/v1/tariffs", get(tariffs_handler))
        .route("/api/v1/vehicles", get(vehicles_handler::<P>))
        .route("/api/v1/reimbursements", post(calculate_handler::<P>))
        .route(
            "/api/v1/reimbursements/statement",
            post(statement_handler::<P>),
        )
        .route("/api/v1/reimbursements/batch", post(batch_handler::<P>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationResponse {
    pub result: ReimbursementResult,
    pub statement: Statement,
}

/// Recompose a previously returned result, optionally with different staff or date.
///
/// The result is recalculated before use. `investigation_date` left out keeps the
/// current date, `null` clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementRequest {
    pub result: ReimbursementResult,
    #[serde(default)]
    pub workers: Option<WorkerCount>,
    #[serde(default, deserialize_with = "present")]
    pub investigation_date: Option<Option<NaiveDate>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub vehicle: String,
    pub period: Period,
    pub csv: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub csv: String,
    pub summary: BatchSummary,
    pub rows: Vec<BatchRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TariffView {
    pub key: String,
    pub label: String,
    pub display_year: u16,
    pub rate_per_km: Decimal,
    pub fuel_price: Decimal,
    pub regulation: &'static str,
    pub time_unit: TimeUnitKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleView {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub fuel_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerOption {
    pub value: WorkerCount,
    pub label: &'static str,
}

pub fn tariff_views() -> Vec<TariffView> {
    supported_periods()
        .into_iter()
        .filter_map(|period| resolve(period).ok())
        .map(|tariff| TariffView {
            key: tariff.period.key(),
            label: tariff.period.to_string(),
            display_year: tariff.display_year,
            rate_per_km: tariff.rate_per_km,
            fuel_price: tariff.fuel_price,
            regulation: tariff.regulation,
            time_unit: TimeUnitKind::for_year(tariff.display_year),
        })
        .collect()
}

pub(crate) async fn tariffs_handler() -> Json<Vec<TariffView>> {
    Json(tariff_views())
}

pub(crate) async fn vehicles_handler<P>(
    State(service): State<Arc<ReimbursementService<P>>>,
) -> Response
where
    P: RouteProvider + 'static,
{
    let vehicles: Vec<VehicleView> = service
        .vehicles()
        .vehicles()
        .iter()
        .map(|vehicle| VehicleView {
            vehicle: vehicle.clone(),
            fuel_label: vehicle.fuel.label(),
        })
        .collect();
    let workers: Vec<WorkerOption> = WorkerCount::all()
        .into_iter()
        .map(|value| WorkerOption {
            value,
            label: worker_label(value),
        })
        .collect();

    let payload = json!({
        "office_address": service.office_address(),
        "vehicles": vehicles,
        "workers": workers,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn calculate_handler<P>(
    State(service): State<Arc<ReimbursementService<P>>>,
    Json(request): Json<CalculationRequest>,
) -> Response
where
    P: RouteProvider + 'static,
{
    let worker = service.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.calculate(request)).await;

    match outcome {
        Ok(Ok(result)) => {
            let statement = service.compose(&result);
            (
                StatusCode::OK,
                Json(CalculationResponse { result, statement }),
            )
                .into_response()
        }
        Ok(Err(err)) => reimbursement_error_response(&err),
        Err(join_error) => internal_error(join_error),
    }
}

pub(crate) async fn statement_handler<P>(
    State(service): State<Arc<ReimbursementService<P>>>,
    Json(request): Json<StatementRequest>,
) -> Response
where
    P: RouteProvider + 'static,
{
    let StatementRequest {
        result,
        workers,
        investigation_date,
    } = request;

    let outcome = service.verify(&result).and_then(|mut result| {
        if let Some(workers) = workers {
            result.set_workers(workers);
        }
        if let Some(date) = investigation_date {
            result.set_investigation_date(date)?;
        }
        Ok(result)
    });

    match outcome {
        Ok(result) => {
            let statement = service.compose(&result);
            (
                StatusCode::OK,
                Json(CalculationResponse { result, statement }),
            )
                .into_response()
        }
        Err(err) => reimbursement_error_response(&err),
    }
}

pub(crate) async fn batch_handler<P>(
    State(service): State<Arc<ReimbursementService<P>>>,
    Json(request): Json<BatchRequest>,
) -> Response
where
    P: RouteProvider + 'static,
{
    let BatchRequest {
        vehicle,
        period,
        csv,
    } = request;

    let outcome = tokio::task::spawn_blocking(move || -> Result<BatchResponse, BatchError> {
        let input = BatchInput::from_reader(Cursor::new(csv.into_bytes()))?;
        let report = batch::process(&service, &input, &vehicle, period)?;
        Ok(BatchResponse {
            csv: report.to_csv_string()?,
            summary: report.summary(),
            rows: report.rows,
        })
    })
    .await;

    match outcome {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(BatchError::Setup(err))) => reimbursement_error_response(&err),
        Ok(Err(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(join_error) => internal_error(join_error),
    }
}

pub(crate) fn reimbursement_status(err: &ReimbursementError) -> StatusCode {
    match err {
        ReimbursementError::Tariff(_) | ReimbursementError::Vehicle(_) => StatusCode::BAD_REQUEST,
        ReimbursementError::Measurement(_)
        | ReimbursementError::InvestigationDate(_)
        | ReimbursementError::EmptyDestination
        | ReimbursementError::InconsistentResult => StatusCode::UNPROCESSABLE_ENTITY,
        ReimbursementError::RouteUnavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

fn reimbursement_error_response(err: &ReimbursementError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (reimbursement_status(err), Json(payload)).into_response()
}

fn internal_error(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "calculation task aborted");
    let payload = json!({ "error": "calculation task aborted" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
