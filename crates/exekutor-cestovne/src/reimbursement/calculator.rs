use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::tariff::{Period, TariffPeriod};
use super::time_loss::{TimeLossCompensation, TimeUnitKind, WorkerCount};
use super::vehicle::Vehicle;
use crate::routing::RouteLeg;

/// Longest one-way leg accepted from routing or a manual entry.
pub const MAX_ONE_WAY_KM: f64 = 1_000.0;
/// Longest one-way driving time accepted, one full day.
pub const MAX_ONE_WAY_MINUTES: f64 = 24.0 * 60.0;

/// How fuel litres are treated before they are priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelLitersRounding {
    /// Litres keep full precision.
    #[default]
    Exact,
    /// Litres are rounded to one decimal place first.
    OneDecimal,
}

impl FuelLitersRounding {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exact" | "full" => Some(Self::Exact),
            "one_decimal" | "one-decimal" | "1" => Some(Self::OneDecimal),
            _ => None,
        }
    }

    fn apply(self, liters: Decimal) -> Decimal {
        match self {
            Self::Exact => liters,
            Self::OneDecimal => half_up(liters, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculationPolicy {
    pub fuel_liters: FuelLitersRounding,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("one-way distance must be between 0 and 1000 km (got {0})")]
    InvalidDistance(f64),
    #[error("one-way duration must be between 0 and 1440 minutes (got {0})")]
    InvalidDuration(f64),
    #[error("compensation amount is out of range")]
    AmountOutOfRange,
}

/// Raised when the investigation date lies outside the tariff year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("investigation date {date} is outside the tariff year {year}")]
pub struct InvestigationDateError {
    pub date: NaiveDate,
    pub year: u16,
}

/// One-way office → destination leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct TripMeasurement {
    one_way_km: f64,
    one_way_minutes: f64,
}

#[derive(Deserialize)]
struct RawMeasurement {
    one_way_km: f64,
    one_way_minutes: f64,
}

impl TryFrom<RawMeasurement> for TripMeasurement {
    type Error = MeasurementError;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        Self::new(raw.one_way_km, raw.one_way_minutes)
    }
}

impl TripMeasurement {
    pub fn new(one_way_km: f64, one_way_minutes: f64) -> Result<Self, MeasurementError> {
        if !(one_way_km.is_finite() && (0.0..=MAX_ONE_WAY_KM).contains(&one_way_km)) {
            return Err(MeasurementError::InvalidDistance(one_way_km));
        }
        if !(one_way_minutes.is_finite() && (0.0..=MAX_ONE_WAY_MINUTES).contains(&one_way_minutes))
        {
            return Err(MeasurementError::InvalidDuration(one_way_minutes));
        }
        Ok(Self {
            one_way_km,
            one_way_minutes,
        })
    }

    /// Converts the routing service's metres and seconds.
    pub fn from_leg(leg: &RouteLeg) -> Result<Self, MeasurementError> {
        Self::new(leg.distance_meters / 1000.0, leg.duration_seconds / 60.0)
    }

    /// Recovers the one-way leg from round-trip figures of an earlier result.
    pub fn from_round_trip(
        round_trip_km: Decimal,
        round_trip_minutes: f64,
    ) -> Result<Self, MeasurementError> {
        let one_way_km = (round_trip_km / Decimal::TWO)
            .to_f64()
            .ok_or(MeasurementError::AmountOutOfRange)?;
        Self::new(one_way_km, round_trip_minutes / 2.0)
    }

    pub fn one_way_km(&self) -> f64 {
        self.one_way_km
    }

    pub fn one_way_minutes(&self) -> f64 {
        self.one_way_minutes
    }

    /// Round trip in kilometres, with the one-way leg taken to whole metres.
    pub fn round_trip_km(&self) -> Decimal {
        // bounded by MAX_ONE_WAY_KM, so the cast cannot truncate
        let meters = (self.one_way_km * 1000.0).round() as i64;
        Decimal::new(meters * 2, 3)
    }

    pub fn round_trip_minutes(&self) -> f64 {
        self.one_way_minutes * 2.0
    }
}

/// Complete breakdown of one reimbursement claim.
///
/// Only `workers` and `investigation_date` may change after `calculate`; the statement
/// can be recomposed for a different staff count without routing the trip again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementResult {
    pub display_year: u16,
    pub period: Period,
    pub destination: String,
    pub round_trip_km: Decimal,
    pub round_trip_minutes: f64,
    pub vehicle_plate: String,
    pub vehicle_model: String,
    pub consumption: Decimal,
    pub rate_per_km: Decimal,
    pub fuel_price: Decimal,
    pub base_amount: Decimal,
    pub fuel_liters: Decimal,
    pub fuel_amount: Decimal,
    pub total_amount: u32,
    pub time_unit: TimeUnitKind,
    pub time_units: u32,
    pub hours: u32,
    pub minutes: u32,
    pub workers: WorkerCount,
    pub regulation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigation_date: Option<NaiveDate>,
}

impl ReimbursementResult {
    pub fn set_workers(&mut self, workers: WorkerCount) {
        self.workers = workers;
    }

    /// Sets or clears the investigation date. The date must fall in the tariff year.
    pub fn set_investigation_date(
        &mut self,
        date: Option<NaiveDate>,
    ) -> Result<(), InvestigationDateError> {
        if let Some(date) = date {
            if date.year() != i32::from(self.display_year) {
                return Err(InvestigationDateError {
                    date,
                    year: self.display_year,
                });
            }
        }
        self.investigation_date = date;
        Ok(())
    }

    pub fn time_loss(&self) -> TimeLossCompensation {
        TimeLossCompensation::compute(self.time_unit, self.time_units, self.workers)
    }

    /// Base plus fuel before the upward rounding to whole crowns.
    pub fn distance_and_fuel_amount(&self) -> Decimal {
        self.base_amount + self.fuel_amount
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReimbursementCalculator {
    policy: CalculationPolicy,
}

impl ReimbursementCalculator {
    pub fn new(policy: CalculationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CalculationPolicy {
        self.policy
    }

    pub fn calculate(
        &self,
        destination: &str,
        measurement: TripMeasurement,
        vehicle: &Vehicle,
        tariff: &TariffPeriod,
    ) -> Result<ReimbursementResult, MeasurementError> {
        let round_trip_km = measurement.round_trip_km();
        let round_trip_minutes = measurement.round_trip_minutes();

        let base_amount = to_hellers(round_trip_km.checked_mul(tariff.rate_per_km))?;
        let liters = (round_trip_km / Decimal::ONE_HUNDRED)
            .checked_mul(vehicle.consumption)
            .ok_or(MeasurementError::AmountOutOfRange)?;
        let fuel_liters = self.policy.fuel_liters.apply(liters);
        let fuel_amount = to_hellers(fuel_liters.checked_mul(tariff.fuel_price))?;
        let total_amount = ceil_crowns(base_amount, fuel_amount)?;

        let time_unit = TimeUnitKind::for_year(tariff.display_year);
        let time_units = time_unit.units_for(round_trip_minutes);
        let whole_minutes = round_trip_minutes.floor() as u32;

        Ok(ReimbursementResult {
            display_year: tariff.display_year,
            period: tariff.period,
            destination: destination.trim().to_string(),
            round_trip_km,
            round_trip_minutes,
            vehicle_plate: vehicle.plate.clone(),
            vehicle_model: vehicle.model.clone(),
            consumption: vehicle.consumption,
            rate_per_km: tariff.rate_per_km,
            fuel_price: tariff.fuel_price,
            base_amount,
            fuel_liters,
            fuel_amount,
            total_amount,
            time_unit,
            time_units,
            hours: whole_minutes / 60,
            minutes: whole_minutes % 60,
            workers: WorkerCount::default(),
            regulation: tariff.regulation.to_string(),
            investigation_date: None,
        })
    }
}

fn half_up(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

fn to_hellers(amount: Option<Decimal>) -> Result<Decimal, MeasurementError> {
    amount
        .map(|amount| half_up(amount, 2))
        .ok_or(MeasurementError::AmountOutOfRange)
}

fn ceil_crowns(base_amount: Decimal, fuel_amount: Decimal) -> Result<u32, MeasurementError> {
    base_amount
        .checked_add(fuel_amount)
        .and_then(|sum| sum.ceil().to_u32())
        .ok_or(MeasurementError::AmountOutOfRange)
}
