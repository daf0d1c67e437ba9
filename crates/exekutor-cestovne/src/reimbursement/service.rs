use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::calculator::{
    InvestigationDateError, MeasurementError, ReimbursementCalculator, ReimbursementResult,
    TripMeasurement,
};
use super::statement::{Statement, StatementComposer};
use super::tariff::{resolve, Period, TariffError, TariffPeriod};
use super::time_loss::WorkerCount;
use super::vehicle::{Vehicle, VehicleError, VehicleTable};
use crate::routing::{RouteError, RouteProvider};

/// Address the round trips start from when nothing else is configured.
pub const DEFAULT_OFFICE_ADDRESS: &str = "Šátalská 469/1, Praha 4, 14100 Praha";

/// Input for a single-address calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub destination: String,
    pub vehicle: String,
    pub period: Period,
    #[serde(default)]
    pub workers: WorkerCount,
    #[serde(default)]
    pub investigation_date: Option<NaiveDate>,
    /// Skips the routing lookup when the one-way leg is already known.
    #[serde(default)]
    pub measurement: Option<TripMeasurement>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReimbursementError {
    #[error(transparent)]
    Tariff(#[from] TariffError),
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
    #[error("route unavailable: {0}")]
    RouteUnavailable(#[from] RouteError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error(transparent)]
    InvestigationDate(#[from] InvestigationDateError),
    #[error("destination address is empty")]
    EmptyDestination,
    #[error("submitted result does not match a recalculation from its own inputs")]
    InconsistentResult,
}

/// Composes routing, tariff lookup, the calculator and the statement composer.
#[derive(Debug)]
pub struct ReimbursementService<P> {
    routes: Arc<P>,
    vehicles: VehicleTable,
    calculator: ReimbursementCalculator,
    composer: StatementComposer,
    office_address: String,
}

impl<P> ReimbursementService<P>
where
    P: RouteProvider + 'static,
{
    pub fn new(
        routes: Arc<P>,
        vehicles: VehicleTable,
        calculator: ReimbursementCalculator,
        composer: StatementComposer,
    ) -> Self {
        Self {
            routes,
            vehicles,
            calculator,
            composer,
            office_address: DEFAULT_OFFICE_ADDRESS.to_string(),
        }
    }

    pub fn with_office_address(mut self, office_address: impl Into<String>) -> Self {
        self.office_address = office_address.into();
        self
    }

    pub fn office_address(&self) -> &str {
        &self.office_address
    }

    pub fn vehicles(&self) -> &VehicleTable {
        &self.vehicles
    }

    /// Resolves the vehicle and tariff up front so a batch fails fast on bad input.
    pub fn prepare(
        &self,
        plate: &str,
        period: Period,
    ) -> Result<(Vehicle, TariffPeriod), ReimbursementError> {
        let vehicle = self.vehicles.get(plate)?.clone();
        let tariff = resolve(period)?;
        Ok((vehicle, tariff))
    }

    /// Routes office → destination and returns the one-way leg.
    pub fn measure(&self, destination: &str) -> Result<TripMeasurement, ReimbursementError> {
        let leg = self
            .routes
            .route(&self.office_address, destination)
            .map_err(|err| {
                warn!(destination, error = %err, "route lookup failed");
                err
            })?;
        Ok(TripMeasurement::from_leg(&leg)?)
    }

    pub fn calculate(
        &self,
        request: CalculationRequest,
    ) -> Result<ReimbursementResult, ReimbursementError> {
        let CalculationRequest {
            destination,
            vehicle,
            period,
            workers,
            investigation_date,
            measurement,
        } = request;

        let (vehicle, tariff) = self.prepare(&vehicle, period)?;
        let mut result = match measurement {
            Some(measurement) => {
                self.calculate_measured(&destination, measurement, &vehicle, &tariff)?
            }
            None => self.calculate_routed(&destination, &vehicle, &tariff)?,
        };
        result.set_workers(workers);
        result.set_investigation_date(investigation_date)?;

        info!(
            destination = %result.destination,
            period = %result.period.key(),
            vehicle = %result.vehicle_plate,
            round_trip_km = %result.round_trip_km,
            total = result.total_amount,
            "reimbursement calculated"
        );
        Ok(result)
    }

    /// Routes and calculates one destination against an already resolved vehicle and tariff.
    pub fn calculate_routed(
        &self,
        destination: &str,
        vehicle: &Vehicle,
        tariff: &TariffPeriod,
    ) -> Result<ReimbursementResult, ReimbursementError> {
        let destination = non_empty(destination)?;
        let measurement = self.measure(destination)?;
        Ok(self
            .calculator
            .calculate(destination, measurement, vehicle, tariff)?)
    }

    fn calculate_measured(
        &self,
        destination: &str,
        measurement: TripMeasurement,
        vehicle: &Vehicle,
        tariff: &TariffPeriod,
    ) -> Result<ReimbursementResult, ReimbursementError> {
        let destination = non_empty(destination)?;
        Ok(self
            .calculator
            .calculate(destination, measurement, vehicle, tariff)?)
    }

    /// Recalculates a previously returned result from its destination, round trip, vehicle
    /// and period without routing. Anything but the worker count and date must match.
    pub fn verify(
        &self,
        submitted: &ReimbursementResult,
    ) -> Result<ReimbursementResult, ReimbursementError> {
        let (vehicle, tariff) = self.prepare(&submitted.vehicle_plate, submitted.period)?;
        let measurement = TripMeasurement::from_round_trip(
            submitted.round_trip_km,
            submitted.round_trip_minutes,
        )?;
        let mut expected =
            self.calculate_measured(&submitted.destination, measurement, &vehicle, &tariff)?;
        expected.set_workers(submitted.workers);
        expected.set_investigation_date(submitted.investigation_date)?;

        if expected != *submitted {
            warn!(
                destination = %submitted.destination,
                submitted_total = submitted.total_amount,
                expected_total = expected.total_amount,
                "submitted result rejected"
            );
            return Err(ReimbursementError::InconsistentResult);
        }
        Ok(expected)
    }

    pub fn compose(&self, result: &ReimbursementResult) -> Statement {
        self.composer.compose(result)
    }
}

fn non_empty(destination: &str) -> Result<&str, ReimbursementError> {
    let trimmed = destination.trim();
    if trimmed.is_empty() {
        Err(ReimbursementError::EmptyDestination)
    } else {
        Ok(trimmed)
    }
}
